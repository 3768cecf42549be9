// ── API-to-domain type conversions ──
//
// Bridges raw `fleetwatch_api` records into canonical `fleetwatch_core::model`
// types. Every default a missing upstream field falls back to lives here.

use chrono::DateTime;

use fleetwatch_api::{AlarmRaw, UnitRaw, parse_datetime};

use crate::model::{Alarm, AlarmId, ClientId, Coordinates, Location, Telemetry, Unit, UnitId};

const UNKNOWN_MODEL: &str = "Unknown model";
const UNKNOWN_ALARM_TYPE: &str = "Unknown Type";
const NO_ADDRESS: &str = "No address provided";

// ── Helpers ────────────────────────────────────────────────────────

/// First non-blank value of the candidates.
fn first_filled<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

// ── Unit ───────────────────────────────────────────────────────────

/// Normalize a raw unit record, before any override is applied.
///
/// `default_client` is the owner assigned when no override names one.
pub fn unit_from_raw(raw: &UnitRaw, default_client: Option<ClientId>) -> Unit {
    let unit_id = UnitId(raw.unit_id);
    let lat = raw.lat.unwrap_or(0.0);
    let lng = raw.lng.unwrap_or(0.0);
    let driver = raw.driver_name().map(str::to_owned);

    Unit {
        unit_id,
        number: first_filled([raw.number.as_deref(), raw.label.as_deref()])
            .map_or_else(|| format!("Vehicle {unit_id}"), str::to_owned),
        model: first_filled([raw.vehicle_title.as_deref()])
            .unwrap_or(UNKNOWN_MODEL)
            .to_owned(),
        last_update: raw
            .last_update
            .as_deref()
            .and_then(parse_datetime)
            .unwrap_or(DateTime::UNIX_EPOCH),
        location: Location {
            lat,
            lng,
            address: format!("Lat: {lat}, Lng: {lng}"),
        },
        ignition: raw.ignition_on(),
        speed: raw.speed.unwrap_or(0.0),
        client_id: default_client,
        is_mock: driver.is_none(),
        driver,
        driver_phone: None,
        telemetry: Telemetry {
            fuel: raw.fuel.clone(),
            can: raw.can.clone(),
            relays: raw.relays.clone(),
            io_din: raw.io_din.clone(),
            supply_voltage: raw.supply_voltage.clone(),
            drivers: raw.drivers.clone().unwrap_or_default(),
        },
    }
}

// ── Alarm ──────────────────────────────────────────────────────────

impl From<AlarmRaw> for Alarm {
    fn from(raw: AlarmRaw) -> Self {
        let device_id = UnitId(raw.unit_id);
        let msg = first_filled([raw.msg.as_deref()]);
        let address = first_filled([raw.address.as_deref()]);
        let message = match (msg, address) {
            (Some(msg), Some(address)) => format!("{msg} - {address}"),
            (Some(text), None) | (None, Some(text)) => text.to_owned(),
            (None, None) => NO_ADDRESS.to_owned(),
        };

        Alarm {
            id: AlarmId::new(device_id, raw.timestamp),
            device_id,
            timestamp: raw.timestamp,
            alarm_type: first_filled([raw.type_name.as_deref()])
                .unwrap_or(UNKNOWN_ALARM_TYPE)
                .to_owned(),
            message,
            location: Coordinates {
                lat: raw.lat,
                lng: raw.lng,
            },
            source_id: raw.alert_id,
        }
    }
}
