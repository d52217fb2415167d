//! Buyer aggregation and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the simulation/search code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{Alternative, Assortment, BuyerCount, CustomerChoice, SolutionFile};
use crate::io::ingest::DatasetStats;

/// Count buyers per offered product, in canonical product order.
///
/// Products in the assortment with zero buyers are still listed; products
/// outside the assortment are not.
pub fn count_buyers(
    choices: &[CustomerChoice],
    assortment: &Assortment,
    product_names: &[String],
) -> Vec<BuyerCount> {
    let mut counts = vec![0usize; product_names.len()];
    for choice in choices {
        if let Alternative::Candidate(j) = choice.alternative {
            counts[j] += 1;
        }
    }

    assortment
        .offered_indices()
        .into_iter()
        .map(|j| BuyerCount {
            product: product_names[j].clone(),
            buyers: counts[j],
        })
        .collect()
}

/// Format the full optimization summary (dataset stats + search result).
pub fn format_run_summary(stats: &DatasetStats, solution: &SolutionFile) -> String {
    let mut out = String::new();

    out.push_str("=== assort - Assortment Optimization ===\n");
    out.push_str(&format!("Method: {}\n", solution.method.display_name()));
    out.push_str(&format!("Target size: {}\n", solution.target_size));
    out.push_str(&format!(
        "Data: customers={} | products={} | utility=[{:.2}, {:.2}]\n",
        stats.n_customers, stats.n_products, stats.u_min, stats.u_max
    ));

    out.push_str("\nBest assortment:\n");
    out.push_str(&format!("- offered: {}\n", fmt_labels(&solution.offered)));
    out.push_str(&format!("- size: {}\n", solution.offered.len()));
    out.push_str(&format!("- profit: {:.2}\n", solution.profit));
    out.push_str(&format!("- objective: {:.2}\n", solution.objective));
    out.push_str(&format!("- evaluations: {}\n", solution.evaluations));

    out.push_str("\nBuyers per product:\n");
    out.push_str(&format_buyer_lines(&solution.buyers));
    let staying = solution.n_customers - solution.buyers.iter().map(|b| b.buyers).sum::<usize>();
    out.push_str(&format!("  {:<16} {:>4}\n", "(status quo)", staying));
    out.push('\n');

    out
}

/// Format the summary for a fixed-assortment evaluation.
pub fn format_evaluation_summary(
    stats: &DatasetStats,
    offered: &[String],
    profit: f64,
    buyers: &[BuyerCount],
) -> String {
    let mut out = String::new();

    out.push_str("=== assort - Assortment Evaluation ===\n");
    out.push_str(&format!(
        "Data: customers={} | products={} | utility=[{:.2}, {:.2}]\n",
        stats.n_customers, stats.n_products, stats.u_min, stats.u_max
    ));
    out.push_str(&format!("Offered: {}\n", fmt_labels(offered)));
    out.push_str(&format!("Profit: {profit:.2}\n"));

    out.push_str("\nBuyers per product:\n");
    out.push_str(&format_buyer_lines(buyers));
    let staying = stats.n_customers - buyers.iter().map(|b| b.buyers).sum::<usize>();
    out.push_str(&format!("  {:<16} {:>4}\n", "(status quo)", staying));
    out.push('\n');

    out
}

/// Format the per-customer choice table.
pub fn format_choice_table(choices: &[CustomerChoice]) -> String {
    let mut out = String::new();

    out.push_str(
        format!(
            "{:<16} {:<16} {:>10} {:>10}\n",
            "customer", "choice", "utility", "margin"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<16} {:-<10} {:-<10}\n", "", "", "", "").trim_end());
    out.push('\n');

    for c in choices {
        out.push_str(
            format!(
                "{:<16} {:<16} {:>10.2} {:>10.2}\n",
                truncate(&c.customer, 16),
                truncate(&c.choice_label, 16),
                c.utility,
                c.margin,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn format_buyer_lines(buyers: &[BuyerCount]) -> String {
    let mut out = String::new();
    if buyers.is_empty() {
        out.push_str("  (none offered)\n");
        return out;
    }
    for b in buyers {
        out.push_str(&format!("  {:<16} {:>4}\n", truncate(&b.product, 16), b.buyers));
    }
    out
}

fn fmt_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        return "(empty)".to_string();
    }
    labels.join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_dataset;
    use crate::domain::{Assortment, Method};
    use crate::sim::simulate_choices;

    fn choices_for(indices: &[usize]) -> (Vec<CustomerChoice>, Assortment, Vec<String>) {
        let (utilities, margins) = reference_dataset().unwrap();
        let assortment = Assortment::from_indices(indices, utilities.n_products()).unwrap();
        let alternatives = simulate_choices(&utilities, &assortment).unwrap();

        let choices = alternatives
            .iter()
            .enumerate()
            .map(|(i, alt)| {
                let utility = match alt {
                    Alternative::StatusQuo => utilities.status_quo(i),
                    Alternative::Candidate(j) => utilities.candidate(i, *j),
                };
                CustomerChoice {
                    customer: utilities.customer_id(i).to_string(),
                    alternative: *alt,
                    choice_label: alt.label(utilities.product_names()),
                    utility,
                    margin: alt.margin(&margins),
                }
            })
            .collect();
        (choices, assortment, utilities.product_names().to_vec())
    }

    #[test]
    fn count_buyers_covers_all_offered_products() {
        let (choices, assortment, names) = choices_for(&[0, 1, 4]);
        let buyers = count_buyers(&choices, &assortment, &names);

        assert_eq!(buyers.len(), 3);
        assert_eq!(buyers[0].product, "p1");
        let bought: usize = buyers.iter().map(|b| b.buyers).sum();
        let staying = choices
            .iter()
            .filter(|c| matches!(c.alternative, Alternative::StatusQuo))
            .count();
        assert_eq!(bought + staying, choices.len());
    }

    #[test]
    fn empty_assortment_reports_all_status_quo() {
        let (choices, assortment, names) = choices_for(&[]);
        let buyers = count_buyers(&choices, &assortment, &names);
        assert!(buyers.is_empty());
        assert!(
            choices
                .iter()
                .all(|c| matches!(c.alternative, Alternative::StatusQuo))
        );
    }

    #[test]
    fn run_summary_mentions_method_and_profit() {
        let (choices, assortment, names) = choices_for(&[0, 1, 4]);
        let buyers = count_buyers(&choices, &assortment, &names);
        let stats = DatasetStats {
            n_customers: 10,
            n_products: 6,
            u_min: 0.0,
            u_max: 9.0,
        };
        let solution = SolutionFile {
            tool: "assort".to_string(),
            method: Method::Exhaustive,
            target_size: 3,
            n_customers: 10,
            n_products: 6,
            offered: assortment.labels(&names),
            profit: 77.0,
            objective: 77.0,
            evaluations: 64,
            buyers,
        };

        let text = format_run_summary(&stats, &solution);
        assert!(text.contains("exhaustive enumeration"));
        assert!(text.contains("profit: 77.00"));
        assert!(text.contains("p1, p2, p5"));
    }

    #[test]
    fn choice_table_has_one_row_per_customer() {
        let (choices, _, _) = choices_for(&[0, 1, 4]);
        let table = format_choice_table(&choices);
        // header + separator + 10 customers
        assert_eq!(table.lines().count(), 12);
        assert!(table.lines().next().unwrap().starts_with("customer"));
    }
}
