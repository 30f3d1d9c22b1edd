use anyhow::Context;
use serde::Serialize;
use tl_ledger::{HashAlgorithm, Ledger};
use tl_types::TrackingEvent;

/// Outcome of one walkthrough step.
#[derive(Clone, Debug, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub description: String,
    pub record_count: usize,
    pub valid: bool,
    pub expected_valid: bool,
}

impl Scenario {
    pub fn passed(&self) -> bool {
        self.valid == self.expected_valid
    }
}

/// Build a chain for `package_id`, extend it twice, then forge a copy.
pub fn run_scenarios(package_id: &str, algorithm: HashAlgorithm) -> anyhow::Result<Vec<Scenario>> {
    let mut scenarios = Vec::with_capacity(4);
    let mut ledger = Ledger::with_algorithm(algorithm);
    scenarios.push(Scenario {
        name: "create",
        description: format!("new ledger holds the genesis record {}", ledger.genesis().digest().short_hex()),
        record_count: ledger.len(),
        valid: ledger.validate(),
        expected_valid: true,
    });

    let genesis = ledger.genesis().digest();
    let linked = ledger
        .append(TrackingEvent::new(package_id, "Shipped"))
        .previous_digest()
        .digest()
        == Some(&genesis);
    scenarios.push(Scenario {
        name: "append",
        description: format!("{package_id}: Shipped links to genesis: {linked}"),
        record_count: ledger.len(),
        valid: ledger.validate() && linked,
        expected_valid: true,
    });

    ledger.append(TrackingEvent::new(package_id, "Delivered"));
    scenarios.push(Scenario {
        name: "extend",
        description: format!("{package_id}: Delivered appended"),
        record_count: ledger.len(),
        valid: ledger.validate(),
        expected_valid: true,
    });

    let forged = forge_status(&ledger, 1, "Delivered")?;
    let description = match forged.verify() {
        Ok(()) => "record 1 rewritten, no violation found".to_string(),
        Err(err) => format!("record 1 rewritten to Delivered: {err}"),
    };
    scenarios.push(Scenario {
        name: "tamper",
        description,
        record_count: forged.len(),
        valid: forged.validate(),
        expected_valid: false,
    });

    Ok(scenarios)
}

/// Copy of `ledger` with the status of record `index` edited in place and
/// its stored digest left untouched.
fn forge_status(ledger: &Ledger, index: usize, status: &str) -> anyhow::Result<Ledger> {
    let mut value = serde_json::to_value(ledger.records())?;
    let slot = value
        .get_mut(index)
        .and_then(|r| r.get_mut("payload"))
        .and_then(|p| p.get_mut("status"))
        .with_context(|| format!("record {index} has no tracking status"))?;
    *slot = serde_json::Value::from(status);
    Ok(Ledger::from_json(&value.to_string(), ledger.algorithm())?)
}
