// navguard_sim/src/scenario/resolver.rs

//! Layering of partial TOML tables: profile under lane overrides, and a
//! lane's initial snapshot under each scripted event.

use figment::value::{Dict, Tag, Value};
use navguard_core::config::LaneConfig;

use super::catalog::ProfileCatalog;
use super::config::LaneScript;
use crate::error::ScenarioError;

/// Recursively merges `overrides` into `base`. Tables merge key by key, every
/// other value is replaced.
pub fn deep_merge(base: &mut Dict, overrides: &Dict) {
    for (key, override_val) in overrides {
        if let Some(base_val) = base.get_mut(key) {
            if let (Some(base_sub), Some(override_sub)) =
                (base_val.as_dict(), override_val.as_dict())
            {
                let mut merged = base_sub.clone();
                deep_merge(&mut merged, override_sub);
                *base_val = Value::Dict(Tag::Default, merged);
                continue;
            }
        }
        base.insert(key.clone(), override_val.clone());
    }
}

/// The lane's configuration: its catalog profile, if any, with the lane's own
/// `config` table merged on top.
pub fn resolve_lane_config(
    lane: &LaneScript,
    catalog: &ProfileCatalog,
) -> Result<LaneConfig, ScenarioError> {
    let mut merged = match &lane.profile {
        Some(profile) => catalog
            .get(profile)
            .ok_or_else(|| ScenarioError::UnknownProfile {
                lane: lane.name.clone(),
                profile: profile.clone(),
            })?
            .clone()
            .into_dict()
            .ok_or_else(|| ScenarioError::ProfileNotATable(profile.clone()))?,
        None => Dict::new(),
    };
    deep_merge(&mut merged, &lane.config);

    let config: LaneConfig = Value::Dict(Tag::Default, merged)
        .deserialize()
        .map_err(|e| ScenarioError::LaneConfig {
            lane: lane.name.clone(),
            source: Box::new(e),
        })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use navguard_core::config::OriginHeightMode;
    use navguard_core::types::VelocitySource;

    fn table(entries: &[(&str, Value)]) -> Dict {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn nested(entries: &[(&str, Value)]) -> Value {
        Value::Dict(Tag::Default, table(entries))
    }

    fn lane(profile: Option<&str>, config: Dict) -> LaneScript {
        LaneScript {
            name: "imu1".to_string(),
            profile: profile.map(str::to_string),
            config,
            initial: Dict::new(),
            events: Vec::new(),
        }
    }

    #[test]
    fn nested_tables_merge_and_leaves_replace() {
        let mut base = table(&[
            ("max_flow_rate", Value::from(2.5)),
            (
                "affinity",
                nested(&[
                    ("magnetometer", Value::from(true)),
                    ("airspeed", Value::from(false)),
                ]),
            ),
        ]);
        let overrides = table(&[(
            "affinity",
            nested(&[("airspeed", Value::from(true))]),
        )]);
        deep_merge(&mut base, &overrides);

        let affinity = base["affinity"].as_dict().unwrap();
        assert!(affinity["magnetometer"].deserialize::<bool>().unwrap());
        assert!(affinity["airspeed"].deserialize::<bool>().unwrap());
        assert_eq!(base["max_flow_rate"].deserialize::<f64>().unwrap(), 2.5);
    }

    #[test]
    fn lane_overrides_apply_over_profile() {
        let mut catalog = ProfileCatalog::default();
        catalog.0.insert(
            "lanes.flow".to_string(),
            nested(&[
                (
                    "sources",
                    nested(&[("velocity_xy", Value::from("OpticalFlow"))]),
                ),
                ("max_flow_rate", Value::from(4.0)),
            ]),
        );
        let overrides = table(&[("origin_height_mode", Value::from("CorrectLocal"))]);

        let config = resolve_lane_config(&lane(Some("lanes.flow"), overrides), &catalog).unwrap();
        assert_eq!(config.sources.velocity_xy, VelocitySource::OpticalFlow);
        assert_eq!(config.origin_height_mode, OriginHeightMode::CorrectLocal);
        assert_eq!(config.max_flow_rate, 4.0);
    }

    #[test]
    fn unknown_profile_and_bad_values_are_errors() {
        let catalog = ProfileCatalog::default();
        assert!(matches!(
            resolve_lane_config(&lane(Some("lanes.missing"), Dict::new()), &catalog),
            Err(ScenarioError::UnknownProfile { .. })
        ));

        let negative = table(&[("max_flow_rate", Value::from(-1.0))]);
        assert!(matches!(
            resolve_lane_config(&lane(None, negative), &catalog),
            Err(ScenarioError::InvalidConfig(_))
        ));

        let typo = table(&[("max_flow_rte", Value::from(1.0))]);
        assert!(matches!(
            resolve_lane_config(&lane(None, typo), &catalog),
            Err(ScenarioError::LaneConfig { .. })
        ));
    }
}
