// ── Device state merger ──
//
// Combines fetched unit records with stored overrides. Pure: the default
// owner is passed in rather than looked up, so the same inputs always give
// the same Unit.

use fleetwatch_api::UnitRaw;

use crate::convert::unit_from_raw;
use crate::model::{Client, ClientId, Unit, UnitId, UnitOverride};
use crate::store::OverrideTable;

/// Lay an override over an already-normalized unit. Override fields win
/// field by field; an override's mere existence clears `is_mock`.
pub fn apply_override(mut unit: Unit, ov: &UnitOverride) -> Unit {
    if let Some(number) = &ov.number {
        unit.number.clone_from(number);
    }
    if let Some(model) = &ov.model {
        unit.model.clone_from(model);
    }
    if let Some(driver) = &ov.driver {
        unit.driver = Some(driver.clone());
    }
    if let Some(phone) = &ov.driver_phone {
        unit.driver_phone = Some(phone.clone());
    }
    if let Some(client_id) = ov.client_id {
        unit.client_id = Some(client_id);
    }
    unit.is_mock = false;
    unit
}

/// Merge one raw record with its override, if any.
pub fn merge_unit(raw: &UnitRaw, default_client: Option<ClientId>, ov: Option<&UnitOverride>) -> Unit {
    let unit = unit_from_raw(raw, default_client);
    match ov {
        Some(ov) => apply_override(unit, ov),
        None => unit,
    }
}

/// Merge a whole upstream listing. The default owner of the unit at
/// position `i` is `clients[i % clients.len()]`.
pub fn merge_units(raw: &[UnitRaw], clients: &[Client], overrides: &OverrideTable) -> Vec<Unit> {
    raw.iter()
        .enumerate()
        .map(|(index, raw)| {
            let default_client = default_client(clients, index);
            merge_unit(raw, default_client, overrides.get(&UnitId(raw.unit_id)))
        })
        .collect()
}

fn default_client(clients: &[Client], index: usize) -> Option<ClientId> {
    if clients.is_empty() {
        return None;
    }
    clients.get(index % clients.len()).map(|c| c.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleetwatch_api::DriverInfo;
    use pretty_assertions::assert_eq;

    use super::*;

    fn client(id: u64) -> Client {
        Client {
            id: ClientId(id),
            company: format!("Company {id}"),
            ..Client::default()
        }
    }

    fn driver_override(name: &str) -> UnitOverride {
        UnitOverride {
            driver: Some(name.into()),
            ..UnitOverride::default()
        }
    }

    #[test]
    fn empty_store_yields_mock_units() {
        let raw = vec![UnitRaw::new(1), UnitRaw::new(2)];
        let units = merge_units(&raw, &[], &OverrideTable::new());

        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| u.is_mock));
        assert!(units.iter().all(|u| u.client_id.is_none()));
    }

    #[test]
    fn override_driver_wins() {
        let raw = UnitRaw::new(7);
        let ov = driver_override("X");
        let unit = merge_unit(&raw, None, Some(&ov));

        assert_eq!(unit.driver.as_deref(), Some("X"));
        assert!(!unit.is_mock);
    }

    #[test]
    fn override_beats_upstream_driver() {
        let mut raw = UnitRaw::new(7);
        raw.drivers = Some(vec![DriverInfo {
            name: Some("Upstream".into()),
            id: None,
        }]);
        let unit = merge_unit(&raw, None, Some(&driver_override("Operator")));
        assert_eq!(unit.driver.as_deref(), Some("Operator"));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut raw = UnitRaw::new(9);
        raw.number = Some("LV-1".into());
        let ov = UnitOverride {
            model: Some("Actros".into()),
            client_id: Some(ClientId(5)),
            ..UnitOverride::default()
        };

        let once = merge_unit(&raw, Some(ClientId(1)), Some(&ov));
        let twice = apply_override(once.clone(), &ov);
        assert_eq!(once, twice);
        assert_eq!(once.client_id, Some(ClientId(5)));
    }

    #[test]
    fn default_clients_assigned_round_robin() {
        let raw: Vec<_> = (1..=3).map(UnitRaw::new).collect();
        let clients = vec![client(10), client(20)];
        let units = merge_units(&raw, &clients, &OverrideTable::new());

        let owners: Vec<_> = units.iter().map(|u| u.client_id.unwrap().0).collect();
        assert_eq!(owners, vec![10, 20, 10]);
    }

    #[test]
    fn overrides_are_looked_up_by_unit_id() {
        let raw = vec![UnitRaw::new(1), UnitRaw::new(7)];
        let mut overrides = OverrideTable::new();
        overrides.insert(UnitId(7), driver_override("X"));

        let units = merge_units(&raw, &[], &overrides);
        assert!(units[0].is_mock);
        assert_eq!(units[1].driver.as_deref(), Some("X"));
        assert!(!units[1].is_mock);
    }
}
