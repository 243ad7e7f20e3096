//! Per-person totals over extracted records, and the transfers that settle
//! them.
//!
//! A summary only: shares are taken as written and never checked against the
//! record amount.

use crate::model::ExpenseRecord;
use serde::Serialize;

/// Totals for one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Person name
    pub name: String,
    /// Sum of amounts this person paid
    pub total_paid: f64,
    /// Sum of this person's shares
    pub total_share: f64,
}

impl Balance {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_paid: 0.0,
            total_share: 0.0,
        }
    }

    /// Paid minus share. Positive means the person is owed money.
    pub fn net(&self) -> f64 {
        self.total_paid - self.total_share
    }
}

/// Balances in a stable order: the given participants first, then anyone
/// else in the order they first appear as payer or share holder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Balances {
    entries: Vec<Balance>,
}

impl Balances {
    fn entry(&mut self, name: &str) -> &mut Balance {
        let idx = match self.entries.iter().position(|b| b.name == name) {
            Some(idx) => idx,
            None => {
                self.entries.push(Balance::new(name));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    /// Look up a person.
    pub fn get(&self, name: &str) -> Option<&Balance> {
        self.entries.iter().find(|b| b.name == name)
    }

    /// Iterate balances in order.
    pub fn iter(&self) -> impl Iterator<Item = &Balance> {
        self.entries.iter()
    }

    /// Number of people.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there is nobody to report.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sum paid amounts and shares per person.
pub fn compute_balances<S: AsRef<str>>(records: &[ExpenseRecord], participants: &[S]) -> Balances {
    let mut balances = Balances::default();
    for name in participants {
        balances.entry(name.as_ref());
    }

    for record in records {
        balances.entry(&record.paid_by).total_paid += record.amount;
        for (name, share) in record.shares.iter() {
            balances.entry(name).total_share += share;
        }
    }

    balances
}

/// Balances closer to zero than this are treated as settled.
pub const SETTLE_TOLERANCE: f64 = 0.01;

/// One transfer from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    /// Person who pays
    pub from: String,
    /// Person who receives
    pub to: String,
    /// Amount, rounded to cents
    pub amount: f64,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pair debtors with creditors until every balance is within
/// [`SETTLE_TOLERANCE`] of zero.
///
/// The largest debt is matched with the largest credit first and each transfer
/// moves the smaller of the two. Ties keep balance order.
pub fn compute_settlements(balances: &Balances) -> Vec<Settlement> {
    let mut debtors: Vec<(&str, f64)> = balances
        .iter()
        .filter(|b| b.net() < -SETTLE_TOLERANCE)
        .map(|b| (b.name.as_str(), b.net()))
        .collect();
    let mut creditors: Vec<(&str, f64)> = balances
        .iter()
        .filter(|b| b.net() > SETTLE_TOLERANCE)
        .map(|b| (b.name.as_str(), b.net()))
        .collect();

    debtors.sort_by(|a, b| a.1.total_cmp(&b.1));
    creditors.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut settlements = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let (debtor, owed) = debtors[i];
        let (creditor, due) = creditors[j];
        let amount = owed.abs().min(due);

        settlements.push(Settlement {
            from: debtor.to_string(),
            to: creditor.to_string(),
            amount: round_cents(amount),
        });

        debtors[i].1 += amount;
        creditors[j].1 -= amount;

        if debtors[i].1.abs() < SETTLE_TOLERANCE {
            i += 1;
        }
        if creditors[j].1 < SETTLE_TOLERANCE {
            j += 1;
        }
    }

    tracing::debug!(transfers = settlements.len(), "settlements computed");
    settlements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shares;

    fn record(id: usize, amount: f64, payer: &str, shares: &[(&str, f64)]) -> ExpenseRecord {
        ExpenseRecord {
            id,
            date: String::new(),
            description: format!("Expense {}", id),
            amount,
            paid_by: payer.to_string(),
            shares: shares.iter().copied().collect::<Shares>(),
        }
    }

    #[test]
    fn test_paid_and_shares() {
        let records = vec![
            record(0, 30.0, "Hamza", &[("Hamza", 10.0), ("Zumair", 10.0), ("Faisal", 10.0)]),
            record(1, 12.0, "Faisal", &[("Hamza", 6.0), ("Zumair", 6.0), ("Faisal", 0.0)]),
        ];

        let balances = compute_balances(&records, &["Hamza", "Zumair", "Faisal"]);
        let hamza = balances.get("Hamza").unwrap();
        assert_eq!(hamza.total_paid, 30.0);
        assert_eq!(hamza.total_share, 16.0);
        assert_eq!(hamza.net(), 14.0);

        let zumair = balances.get("Zumair").unwrap();
        assert_eq!(zumair.total_paid, 0.0);
        assert_eq!(zumair.net(), -16.0);

        let faisal = balances.get("Faisal").unwrap();
        assert_eq!(faisal.net(), 2.0);
    }

    #[test]
    fn test_unknown_payer_appended() {
        let records = vec![record(3, 9.0, "Unknown", &[("Hamza", 9.0)])];
        let balances = compute_balances(&records, &["Hamza", "Zumair"]);
        let names: Vec<_> = balances.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Hamza", "Zumair", "Unknown"]);
        assert_eq!(balances.get("Unknown").unwrap().net(), 9.0);
    }

    #[test]
    fn test_settlements_largest_first() {
        // Net: Hamza +40, Zumair -10, Faisal -30
        let records = vec![record(
            0,
            60.0,
            "Hamza",
            &[("Hamza", 20.0), ("Zumair", 10.0), ("Faisal", 30.0)],
        )];
        let balances = compute_balances(&records, &["Hamza", "Zumair", "Faisal"]);

        let settlements = compute_settlements(&balances);
        assert_eq!(
            settlements,
            vec![
                Settlement {
                    from: "Faisal".to_string(),
                    to: "Hamza".to_string(),
                    amount: 30.0,
                },
                Settlement {
                    from: "Zumair".to_string(),
                    to: "Hamza".to_string(),
                    amount: 10.0,
                },
            ]
        );
    }

    #[test]
    fn test_settlements_split_across_creditors() {
        // Net: Hamza +20, Zumair +10, Faisal -30
        let records = vec![
            record(0, 30.0, "Hamza", &[("Hamza", 10.0), ("Faisal", 20.0)]),
            record(1, 10.0, "Zumair", &[("Faisal", 10.0)]),
        ];
        let balances = compute_balances(&records, &["Hamza", "Zumair", "Faisal"]);

        let settlements = compute_settlements(&balances);
        assert_eq!(settlements.len(), 2);
        assert_eq!(settlements[0].from, "Faisal");
        assert_eq!(settlements[0].to, "Hamza");
        assert_eq!(settlements[0].amount, 20.0);
        assert_eq!(settlements[1].to, "Zumair");
        assert_eq!(settlements[1].amount, 10.0);
    }

    #[test]
    fn test_settlements_round_to_cents() {
        // Net: Hamza +6.6666..., Zumair -3.3333..., Faisal -3.3333...
        let third = 10.0 / 3.0;
        let records = vec![record(
            0,
            10.0,
            "Hamza",
            &[("Hamza", third), ("Zumair", third), ("Faisal", third)],
        )];
        let balances = compute_balances(&records, &["Hamza", "Zumair", "Faisal"]);

        let settlements = compute_settlements(&balances);
        assert_eq!(settlements.len(), 2);
        assert!(settlements.iter().all(|s| s.amount == 3.33 && s.to == "Hamza"));
    }

    #[test]
    fn test_settlements_ignore_small_balances() {
        let records = vec![record(0, 10.0, "Hamza", &[("Hamza", 9.995), ("Zumair", 0.005)])];
        let balances = compute_balances(&records, &["Hamza", "Zumair"]);
        assert!(compute_settlements(&balances).is_empty());
        assert!(compute_settlements(&Balances::default()).is_empty());
    }

    #[test]
    fn test_settlement_json() {
        let settlement = Settlement {
            from: "Zumair".to_string(),
            to: "Hamza".to_string(),
            amount: 12.5,
        };
        let json = serde_json::to_string(&settlement).unwrap();
        assert_eq!(json, r#"{"from":"Zumair","to":"Hamza","amount":12.5}"#);
    }

    #[test]
    fn test_participants_without_records() {
        let balances = compute_balances(&[], &["Ana"]);
        assert_eq!(balances.len(), 1);
        assert_eq!(balances.get("Ana").unwrap().net(), 0.0);
    }
}
