// Response shape normalization
//
// The tracking API has shipped two shapes for the alert list over time:
// a plain array and an object keyed by alert id. Both are accepted here;
// anything else is a malformed response, never a silent empty list.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::tracker::models::{AlarmRaw, AlertRecord, UnitRaw, parse_datetime};

/// Extract `data.units` as device records.
pub(crate) fn units(body: &Value) -> Result<Vec<UnitRaw>, Error> {
    let Some(list) = body.pointer("/data/units").and_then(Value::as_array) else {
        return Err(malformed("expected `data.units` to be an array", body));
    };

    list.iter()
        .map(|item| record::<UnitRaw>(item, "unit", body))
        .collect()
}

/// Extract `data.alerts` as normalized alarms, accepting both known shapes.
pub(crate) fn alerts(body: &Value) -> Result<Vec<AlarmRaw>, Error> {
    let items: Vec<&Value> = match body.pointer("/data/alerts") {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(Value::Object(keyed)) => keyed.values().collect(),
        Some(_) => {
            return Err(malformed(
                "expected `data.alerts` to be an array or an object of alerts",
                body,
            ));
        }
        None => return Err(malformed("missing `data.alerts`", body)),
    };

    items
        .into_iter()
        .map(|item| {
            let alert: AlertRecord = record(item, "alert", body)?;
            alarm_from_record(alert, body)
        })
        .collect()
}

fn alarm_from_record(alert: AlertRecord, body: &Value) -> Result<AlarmRaw, Error> {
    let Some(timestamp) = parse_datetime(&alert.datetime) else {
        return Err(malformed(
            &format!("unparseable alert datetime `{}`", alert.datetime),
            body,
        ));
    };

    let alert_id = alert.alert_id.and_then(|id| match id {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    Ok(AlarmRaw {
        alert_id,
        unit_id: alert.unit_id,
        timestamp,
        type_name: alert.type_name,
        msg: alert.msg,
        address: alert.address,
        lat: alert.lat.unwrap_or_default(),
        lng: alert.lng.unwrap_or_default(),
    })
}

fn record<T: DeserializeOwned>(item: &Value, what: &str, body: &Value) -> Result<T, Error> {
    serde_json::from_value(item.clone())
        .map_err(|e| malformed(&format!("invalid {what} record: {e}"), body))
}

fn malformed(message: &str, body: &Value) -> Error {
    Error::MalformedResponse {
        message: message.to_owned(),
        body: body.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn alert(id: u64, unit: u64, datetime: &str) -> Value {
        json!({
            "alert_id": id,
            "unit_id": unit,
            "datetime": datetime,
            "type_name": "Speeding",
            "msg": "Over limit",
            "address": "Main St 1",
            "lat": 56.9,
            "lng": 24.1
        })
    }

    #[test]
    fn units_array_is_read() {
        let body = json!({ "data": { "units": [
            { "unit_id": 7, "number": "AB-123", "lat": 1.5, "lng": 2.5 },
            { "unit_id": 8 }
        ]}});

        let units = units(&body).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].number.as_deref(), Some("AB-123"));
        assert_eq!(units[1], UnitRaw::new(8));
    }

    #[test]
    fn units_missing_array_is_malformed() {
        for body in [
            json!({}),
            json!({ "data": {} }),
            json!({ "data": { "units": { "7": {} } } }),
        ] {
            assert!(
                matches!(units(&body), Err(Error::MalformedResponse { .. })),
                "{body} should be malformed"
            );
        }
    }

    #[test]
    fn unit_without_id_is_malformed() {
        let body = json!({ "data": { "units": [{ "number": "X" }] } });
        assert!(matches!(units(&body), Err(Error::MalformedResponse { .. })));
    }

    #[test]
    fn alert_array_and_keyed_object_normalize_identically() {
        let array = json!({ "data": { "alerts": [alert(1, 7, "2024-05-10T12:00:00Z")] } });
        let keyed = json!({ "data": { "alerts": { "1": alert(1, 7, "2024-05-10 12:00:00") } } });

        let a = alerts(&array).unwrap();
        let b = alerts(&keyed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].alert_id.as_deref(), Some("1"));
        assert_eq!(a[0].type_name.as_deref(), Some("Speeding"));
    }

    #[test]
    fn empty_alert_list_is_not_an_error() {
        let body = json!({ "data": { "alerts": [] } });
        assert!(alerts(&body).unwrap().is_empty());
    }

    #[test]
    fn unknown_alert_shapes_are_malformed() {
        for body in [
            json!({ "data": {} }),
            json!({ "data": { "alerts": null } }),
            json!({ "data": { "alerts": "none" } }),
            json!({ "data": { "alerts": [{ "unit_id": 7 }] } }),
            json!({ "data": { "alerts": [alert(1, 7, "not a date")] } }),
        ] {
            assert!(
                matches!(alerts(&body), Err(Error::MalformedResponse { .. })),
                "{body} should be malformed"
            );
        }
    }

    #[test]
    fn alert_type_alias_and_string_ids_are_accepted() {
        let body = json!({ "data": { "alerts": [{
            "alert_id": "a-1",
            "unit_id": 3,
            "datetime": "2024-05-10T12:00:00Z",
            "alert_type": "Panic"
        }]}});

        let alarm = &alerts(&body).unwrap()[0];
        assert_eq!(alarm.alert_id.as_deref(), Some("a-1"));
        assert_eq!(alarm.type_name.as_deref(), Some("Panic"));
        assert_eq!((alarm.lat, alarm.lng), (0.0, 0.0));
    }
}
