//! Level scripts and the playback timeline
//!
//! A level is a list of time-stamped spawn records. Loading happens in two
//! passes over already-parsed JSON:
//! 1. every `"random(low, high)"` string is rolled once into a number
//! 2. records are validated into typed `LevelEvent`s and sorted by time
//!
//! The resulting `LevelScript` is fully concrete, so rewinding the
//! `Timeline` replays exactly the same hazards.

use std::path::Path;

use glam::Vec2;
use rand::distr::Uniform;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::hazard::{Hazard, Piston, Rgb, SpikeZone, SpinningProjectile};
use crate::consts::*;
use crate::rotate_degrees;

/// Level loading failure; any error aborts the whole load
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid level JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level script must be a JSON array of events")]
    NotAnArray,
    #[error("event {index} is not a JSON object")]
    NotAnObject { index: usize },
    #[error("event {index} has a missing or non-numeric time")]
    BadTime { index: usize },
    #[error("event {index} has a missing or non-string type")]
    MissingType { index: usize },
    #[error("event {index} has unknown type {kind:?}")]
    UnknownType { index: usize, kind: String },
    #[error("malformed range expression {expr:?}")]
    BadRange { expr: String },
    #[error("event {index} ({kind}) has a non-finite {field}")]
    NonFinite {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("event {index} ({kind}): {source}")]
    InvalidEvent {
        index: usize,
        kind: &'static str,
        source: serde_json::Error,
    },
}

/// Parse `random(low, high)`; `Ok(None)` for strings that are not range expressions
fn parse_range(text: &str) -> Result<Option<(f64, f64)>, LevelError> {
    let Some(rest) = text.trim().strip_prefix("random(") else {
        return Ok(None);
    };
    let bad = || LevelError::BadRange {
        expr: text.to_string(),
    };

    let args = rest.strip_suffix(')').ok_or_else(bad)?;
    let (low, high) = args.split_once(',').ok_or_else(bad)?;
    let low: f64 = low.trim().parse().map_err(|_| bad())?;
    let high: f64 = high.trim().parse().map_err(|_| bad())?;
    if !low.is_finite() || !high.is_finite() {
        return Err(bad());
    }
    Ok(Some((low, high)))
}

/// Uniform sample from a range given in either order
fn sample_range(rng: &mut impl Rng, expr: &str, low: f64, high: f64) -> Result<f64, LevelError> {
    if low == high {
        return Ok(low);
    }
    let dist = Uniform::new_inclusive(low.min(high), low.max(high)).map_err(|_| {
        LevelError::BadRange {
            expr: expr.to_string(),
        }
    })?;
    Ok(rng.sample(dist))
}

/// Replace every range expression in a JSON tree with a rolled number
pub fn resolve_ranges(value: &Value, rng: &mut impl Rng) -> Result<Value, LevelError> {
    Ok(match value {
        Value::String(text) => match parse_range(text)? {
            Some((low, high)) => Value::from(sample_range(rng, text, low, high)?),
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_ranges(item, rng))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, v)| Ok::<_, LevelError>((key.clone(), resolve_ranges(v, rng)?)))
                .collect::<Result<_, LevelError>>()?,
        ),
        _ => value.clone(),
    })
}

/// Optional field that falls back to its default when malformed
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            log::warn!("Ignoring malformed event parameter {value}: {err}");
            Ok(None)
        }
    }
}

#[derive(Deserialize)]
struct ProjectileRecord {
    pos: [f32; 2],
    #[serde(default, deserialize_with = "lenient")]
    direction_angle: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    speed: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    lifetime: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    spin_speed: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    size: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    color: Option<Rgb>,
}

#[derive(Deserialize)]
struct PistonRecord {
    pos: [f32; 2],
    direction: [f32; 2],
    length: f32,
    #[serde(default, deserialize_with = "lenient")]
    width: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    speed: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    delay: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    lifetime: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    color: Option<Rgb>,
}

#[derive(Deserialize)]
struct SpikeRecord {
    pos: [f32; 2],
    #[serde(default, deserialize_with = "lenient")]
    size: Option<f32>,
    #[serde(default, deserialize_with = "lenient")]
    color: Option<Rgb>,
}

/// Concrete projectile spawn parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpawn {
    pub pos: Vec2,
    /// Heading in degrees from +x
    pub direction_angle: f32,
    pub speed: f32,
    pub lifetime: f32,
    pub spin_speed: f32,
    pub size: f32,
    pub color: Rgb,
}

impl From<ProjectileRecord> for ProjectileSpawn {
    fn from(r: ProjectileRecord) -> Self {
        Self {
            pos: Vec2::from(r.pos),
            direction_angle: r.direction_angle.unwrap_or(0.0),
            speed: r.speed.unwrap_or(PROJECTILE_SPEED),
            lifetime: r.lifetime.unwrap_or(PROJECTILE_LIFETIME),
            spin_speed: r.spin_speed.unwrap_or(0.0),
            size: r.size.unwrap_or(PROJECTILE_SIZE),
            color: r.color.unwrap_or_default(),
        }
    }
}

/// Concrete piston spawn parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PistonSpawn {
    pub pos: Vec2,
    pub direction: Vec2,
    pub length: f32,
    pub width: f32,
    pub speed: f32,
    pub delay: f32,
    /// `None` lives forever
    pub lifetime: Option<f32>,
    pub color: Rgb,
}

impl From<PistonRecord> for PistonSpawn {
    fn from(r: PistonRecord) -> Self {
        Self {
            pos: Vec2::from(r.pos),
            direction: Vec2::from(r.direction),
            length: r.length,
            width: r.width.unwrap_or(PISTON_WIDTH),
            speed: r.speed.unwrap_or(PISTON_SPEED),
            delay: r.delay.unwrap_or(PISTON_DELAY),
            lifetime: r.lifetime,
            color: r.color.unwrap_or_default(),
        }
    }
}

/// Concrete spike spawn parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeSpawn {
    pub pos: Vec2,
    pub size: f32,
    pub color: Rgb,
}

impl From<SpikeRecord> for SpikeSpawn {
    fn from(r: SpikeRecord) -> Self {
        Self {
            pos: Vec2::from(r.pos),
            size: r.size.unwrap_or(SPIKE_SIZE),
            color: r.color.unwrap_or_default(),
        }
    }
}

/// What a level event spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEventKind {
    SpawnProjectile(ProjectileSpawn),
    SpawnPiston(PistonSpawn),
    SpawnSpike(SpikeSpawn),
}

impl LevelEventKind {
    /// First parameter that is infinite or NaN, if any
    fn non_finite_field(&self) -> Option<&'static str> {
        let fields: Vec<(&'static str, bool)> = match self {
            Self::SpawnProjectile(p) => vec![
                ("pos", p.pos.is_finite()),
                ("direction_angle", p.direction_angle.is_finite()),
                ("speed", p.speed.is_finite()),
                ("lifetime", p.lifetime.is_finite()),
                ("spin_speed", p.spin_speed.is_finite()),
                ("size", p.size.is_finite()),
            ],
            Self::SpawnPiston(p) => vec![
                ("pos", p.pos.is_finite()),
                ("direction", p.direction.is_finite()),
                ("length", p.length.is_finite()),
                ("width", p.width.is_finite()),
                ("speed", p.speed.is_finite()),
                ("delay", p.delay.is_finite()),
                ("lifetime", p.lifetime.is_none_or(f32::is_finite)),
            ],
            Self::SpawnSpike(s) => vec![("pos", s.pos.is_finite()), ("size", s.size.is_finite())],
        };
        fields.into_iter().find(|(_, ok)| !ok).map(|(name, _)| name)
    }
}

/// A scheduled spawn, `time` seconds after level start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEvent {
    pub time: f32,
    pub kind: LevelEventKind,
}

impl LevelEvent {
    /// Build the hazard this event describes
    pub fn to_hazard(&self) -> Hazard {
        match &self.kind {
            LevelEventKind::SpawnProjectile(p) => {
                SpinningProjectile::new(p.pos, rotate_degrees(Vec2::X, p.direction_angle), p.speed, p.lifetime)
                    .with_spin(p.spin_speed)
                    .with_size(p.size)
                    .with_color(p.color)
                    .into()
            }
            LevelEventKind::SpawnPiston(p) => Piston::new(p.pos, p.direction, p.length)
                .with_width(p.width)
                .with_speed(p.speed)
                .with_delay(p.delay)
                .with_lifetime(p.lifetime)
                .with_color(p.color)
                .into(),
            LevelEventKind::SpawnSpike(s) => {
                let mut spike = SpikeZone::new(s.pos, s.size);
                spike.color = s.color;
                spike.into()
            }
        }
    }
}

fn parse_record<T, S>(index: usize, kind: &'static str, record: Value) -> Result<S, LevelError>
where
    T: DeserializeOwned + Into<S>,
{
    serde_json::from_value::<T>(record)
        .map(Into::into)
        .map_err(|source| LevelError::InvalidEvent {
            index,
            kind,
            source,
        })
}

fn parse_event(index: usize, record: Value) -> Result<LevelEvent, LevelError> {
    let fields = record.as_object().ok_or(LevelError::NotAnObject { index })?;

    let time = fields
        .get("time")
        .and_then(Value::as_f64)
        .map(|t| t as f32)
        .filter(|t| t.is_finite())
        .ok_or(LevelError::BadTime { index })?;
    let type_name = fields.get("type").and_then(Value::as_str).map(str::to_owned);

    let (kind, kind_name) = match type_name.as_deref() {
        Some("moving_object") => (
            LevelEventKind::SpawnProjectile(parse_record::<ProjectileRecord, _>(
                index,
                "moving_object",
                record,
            )?),
            "moving_object",
        ),
        Some("piston") => (
            LevelEventKind::SpawnPiston(parse_record::<PistonRecord, _>(index, "piston", record)?),
            "piston",
        ),
        Some("spike") => (
            LevelEventKind::SpawnSpike(parse_record::<SpikeRecord, _>(index, "spike", record)?),
            "spike",
        ),
        Some(other) => {
            return Err(LevelError::UnknownType {
                index,
                kind: other.to_string(),
            });
        }
        None => return Err(LevelError::MissingType { index }),
    };

    if let Some(field) = kind.non_finite_field() {
        return Err(LevelError::NonFinite {
            index,
            kind: kind_name,
            field,
        });
    }

    Ok(LevelEvent { time, kind })
}

/// A fully resolved, time-sorted event script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelScript {
    events: Vec<LevelEvent>,
}

impl LevelScript {
    /// Wrap already-concrete events, sorting them by time (stable)
    pub fn from_events(mut events: Vec<LevelEvent>) -> Self {
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { events }
    }

    /// Resolve ranges with `rng`, then validate and sort
    pub fn from_value_with_rng(raw: &Value, rng: &mut impl Rng) -> Result<Self, LevelError> {
        let resolved = resolve_ranges(raw, rng)?;
        let Value::Array(records) = resolved else {
            return Err(LevelError::NotAnArray);
        };

        let events = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| parse_event(index, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_events(events))
    }

    /// Resolve ranges with an RNG seeded from `seed`, then validate and sort
    pub fn from_value(raw: &Value, seed: u64) -> Result<Self, LevelError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self::from_value_with_rng(raw, &mut rng)
    }

    pub fn from_json_str(json: &str, seed: u64) -> Result<Self, LevelError> {
        let raw: Value = serde_json::from_str(json)?;
        Self::from_value(&raw, seed)
    }

    pub fn load(path: impl AsRef<Path>, seed: u64) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let script = Self::from_json_str(&json, seed)?;
        log::info!(
            "Loaded level {} ({} events, seed {})",
            path.display(),
            script.len(),
            seed
        );
        Ok(script)
    }

    pub fn events(&self) -> &[LevelEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Cursor over a level script, driven by the level clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    script: LevelScript,
    cursor: usize,
}

impl Timeline {
    pub fn new(script: LevelScript) -> Self {
        Self { script, cursor: 0 }
    }

    /// Every not-yet-released event with `time <= elapsed`, in script order
    ///
    /// Each event is returned exactly once however large the jump in `elapsed`.
    pub fn release_due(&mut self, elapsed: f32) -> &[LevelEvent] {
        let start = self.cursor;
        let events = self.script.events();
        while self.cursor < events.len() && events[self.cursor].time <= elapsed {
            self.cursor += 1;
        }
        &events[start..self.cursor]
    }

    /// Start playback over with the same resolved events
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Time of the next pending event
    pub fn next_time(&self) -> Option<f32> {
        self.script.events().get(self.cursor).map(|e| e.time)
    }

    pub fn released(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.script.len() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    pub fn script(&self) -> &LevelScript {
        &self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazard::HazardKind;
    use proptest::prelude::*;
    use serde_json::json;

    fn projectile_at(time: f32) -> LevelEvent {
        LevelEvent {
            time,
            kind: LevelEventKind::SpawnProjectile(ProjectileSpawn {
                pos: Vec2::ZERO,
                direction_angle: 0.0,
                speed: PROJECTILE_SPEED,
                lifetime: PROJECTILE_LIFETIME,
                spin_speed: 0.0,
                size: PROJECTILE_SIZE,
                color: Rgb::default(),
            }),
        }
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("random(1, 5)").unwrap(), Some((1.0, 5.0)));
        assert_eq!(parse_range("random(-2.5,3)").unwrap(), Some((-2.5, 3.0)));
        assert_eq!(parse_range("pink").unwrap(), None);
        assert!(matches!(
            parse_range("random(1 5)"),
            Err(LevelError::BadRange { .. })
        ));
        assert!(matches!(
            parse_range("random(a, 5)"),
            Err(LevelError::BadRange { .. })
        ));
    }

    #[test]
    fn test_resolve_ranges_nested() {
        let raw = json!([{ "pos": ["random(10, 20)", 5], "tag": "keep" }]);
        let mut rng = Pcg32::seed_from_u64(7);
        let resolved = resolve_ranges(&raw, &mut rng).unwrap();

        let x = resolved[0]["pos"][0].as_f64().unwrap();
        assert!((10.0..=20.0).contains(&x));
        assert_eq!(resolved[0]["pos"][1], json!(5));
        assert_eq!(resolved[0]["tag"], json!("keep"));
    }

    #[test]
    fn test_resolve_same_seed_same_values() {
        let raw = json!([
            { "time": 1.0, "type": "moving_object", "pos": [0, 0], "speed": "random(100, 400)" },
            { "time": 2.0, "type": "moving_object", "pos": [0, 0], "speed": "random(100, 400)" }
        ]);
        let a = LevelScript::from_value(&raw, 42).unwrap();
        let b = LevelScript::from_value(&raw, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_defaults_for_missing_and_malformed_fields() {
        let raw = json!([
            { "time": 0.5, "type": "moving_object", "pos": [100, 200], "speed": "fast" },
            { "time": 0.2, "type": "piston", "pos": [0, 0], "direction": [1, 0], "length": 300 }
        ]);
        let script = LevelScript::from_value(&raw, 1).unwrap();
        let events = script.events();

        // Sorted by time
        assert_eq!(events[0].time, 0.2);
        let LevelEventKind::SpawnPiston(piston) = &events[0].kind else {
            panic!("expected piston first");
        };
        assert_eq!(piston.width, PISTON_WIDTH);
        assert_eq!(piston.speed, PISTON_SPEED);
        assert_eq!(piston.delay, PISTON_DELAY);
        assert_eq!(piston.lifetime, None);

        let LevelEventKind::SpawnProjectile(projectile) = &events[1].kind else {
            panic!("expected projectile second");
        };
        assert_eq!(projectile.pos, Vec2::new(100.0, 200.0));
        assert_eq!(projectile.speed, PROJECTILE_SPEED);
        assert_eq!(projectile.lifetime, PROJECTILE_LIFETIME);
        assert_eq!(projectile.color, Rgb(HAZARD_COLOR));
    }

    #[test]
    fn test_structural_errors_abort_load() {
        let missing_pos = json!([{ "time": 1.0, "type": "moving_object" }]);
        assert!(matches!(
            LevelScript::from_value(&missing_pos, 0),
            Err(LevelError::InvalidEvent { index: 0, .. })
        ));

        let unknown = json!([
            { "time": 1.0, "type": "spike", "pos": [0, 0] },
            { "time": 1.0, "type": "laser" }
        ]);
        assert!(matches!(
            LevelScript::from_value(&unknown, 0),
            Err(LevelError::UnknownType { index: 1, .. })
        ));

        let no_time = json!([{ "type": "spike", "pos": [0, 0] }]);
        assert!(matches!(
            LevelScript::from_value(&no_time, 0),
            Err(LevelError::BadTime { index: 0 })
        ));

        let bad_range = json!([{ "time": "random(1, x)", "type": "spike", "pos": [0, 0] }]);
        assert!(matches!(
            LevelScript::from_value(&bad_range, 0),
            Err(LevelError::BadRange { .. })
        ));

        assert!(matches!(
            LevelScript::from_value(&json!({ "events": [] }), 0),
            Err(LevelError::NotAnArray)
        ));
        assert!(matches!(
            LevelScript::from_json_str("[{", 0),
            Err(LevelError::Json(_))
        ));
    }

    #[test]
    fn test_overflowing_range_aborts_load() {
        let raw = json!([{ "time": 0.0, "type": "spike", "pos": ["random(-1e308, 1e308)", 0] }]);
        let err = LevelScript::from_value(&raw, 1).unwrap_err();
        assert!(matches!(err, LevelError::BadRange { expr } if expr == "random(-1e308, 1e308)"));
    }

    #[test]
    fn test_values_beyond_f32_abort_load() {
        let fast = json!([{ "time": 0.0, "type": "moving_object", "pos": [0, 0], "speed": 1e39 }]);
        assert!(matches!(
            LevelScript::from_value(&fast, 0),
            Err(LevelError::NonFinite {
                index: 0,
                kind: "moving_object",
                field: "speed"
            })
        ));

        let far = json!([
            { "time": 0.0, "type": "spike", "pos": [0, 0] },
            { "time": 0.0, "type": "piston", "pos": [0, 0], "direction": [1, 0],
              "length": 100, "lifetime": -1e300 }
        ]);
        assert!(matches!(
            LevelScript::from_value(&far, 0),
            Err(LevelError::NonFinite {
                index: 1,
                kind: "piston",
                field: "lifetime"
            })
        ));

        let late = json!([{ "time": 1e39, "type": "spike", "pos": [0, 0] }]);
        assert!(matches!(
            LevelScript::from_value(&late, 0),
            Err(LevelError::BadTime { index: 0 })
        ));
    }

    #[test]
    fn test_event_builds_hazard() {
        let raw = json!([{
            "time": 0.0, "type": "moving_object", "pos": [10, 10],
            "direction_angle": 90, "speed": 50, "spin_speed": 180
        }]);
        let script = LevelScript::from_value(&raw, 0).unwrap();
        let Hazard::Projectile(p) = script.events()[0].to_hazard() else {
            panic!("expected projectile");
        };
        assert!(p.direction.x.abs() < 1e-5);
        assert!((p.direction.y - 1.0).abs() < 1e-5);
        assert_eq!(p.spin_speed, 180.0);
        assert_eq!(script.events()[0].to_hazard().kind(), HazardKind::Projectile);
    }

    #[test]
    fn test_release_due_catches_up_in_order() {
        let script = LevelScript::from_events(vec![
            projectile_at(3.0),
            projectile_at(1.0),
            projectile_at(2.0),
            projectile_at(10.0),
        ]);
        let mut timeline = Timeline::new(script);

        assert!(timeline.release_due(0.5).is_empty());
        let due: Vec<f32> = timeline.release_due(3.0).iter().map(|e| e.time).collect();
        assert_eq!(due, vec![1.0, 2.0, 3.0]);
        assert!(timeline.release_due(3.0).is_empty());
        assert_eq!(timeline.next_time(), Some(10.0));
        assert_eq!(timeline.release_due(100.0).len(), 1);
        assert!(timeline.is_finished());
    }

    #[test]
    fn test_rewind_replays_same_rolls() {
        let raw = json!([{ "time": 0.0, "type": "spike", "pos": ["random(0, 1000)", 0] }]);
        let mut timeline = Timeline::new(LevelScript::from_value(&raw, 3).unwrap());

        let first = timeline.release_due(1.0).to_vec();
        timeline.rewind();
        let second = timeline.release_due(1.0).to_vec();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_each_event_released_exactly_once(
            times in prop::collection::vec(0.0f32..60.0, 0..40),
            mut clock in prop::collection::vec(0.0f32..70.0, 1..40),
        ) {
            clock.sort_by(|a, b| a.total_cmp(b));
            let total = times.len();
            let mut timeline = Timeline::new(LevelScript::from_events(
                times.into_iter().map(projectile_at).collect(),
            ));

            let mut released = Vec::new();
            for now in clock.iter().copied() {
                for event in timeline.release_due(now) {
                    prop_assert!(event.time <= now);
                    released.push(event.time);
                }
            }
            prop_assert!(released.len() <= total);
            prop_assert!(released.windows(2).all(|w| w[0] <= w[1]));

            timeline.release_due(f32::MAX);
            prop_assert_eq!(timeline.released(), total);
        }
    }
}
