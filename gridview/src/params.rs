// params.rs - Simulation parameters shared with the host

use std::collections::BTreeMap;

use log::debug;

use crate::config::ParameterBounds;

pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";

/// Ordered name → value set. `width` and `height` are always present and
/// drive the grid dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, u32)>,
    bounds: ParameterBounds,
}

impl Parameters {
    pub fn new(width: u32, height: u32, bounds: ParameterBounds) -> Self {
        let mut params = Self { entries: Vec::new(), bounds };
        params.set(WIDTH, width as f64);
        params.set(HEIGHT, height as f64);
        params
    }

    pub fn bounds(&self) -> ParameterBounds {
        self.bounds
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }

    pub fn width(&self) -> u32 {
        self.get(WIDTH).unwrap_or(self.bounds.min)
    }

    pub fn height(&self) -> u32 {
        self.get(HEIGHT).unwrap_or(self.bounds.min)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clamps `value` into bounds and stores it, adding the name if new.
    pub fn set(&mut self, name: &str, value: f64) -> u32 {
        let value = self.clamp(value);
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
        value
    }

    /// Merges every entry; unknown names are added.
    pub fn merge(&mut self, incoming: &BTreeMap<String, f64>) {
        for (name, &value) in incoming {
            let stored = self.set(name, value);
            debug!("Parameter {} = {} (from {})", name, stored, value);
        }
    }

    /// Merges only names already present.
    pub fn merge_known(&mut self, incoming: &BTreeMap<String, f64>) {
        for (name, &value) in incoming {
            if self.contains(name) {
                let previous = self.get(name);
                let stored = self.set(name, value);
                debug!("Setting parameter {} to {} (was {:?})", name, stored, previous);
            } else {
                debug!("Ignoring unknown imported parameter {}", name);
            }
        }
    }

    /// Applies text typed into a parameter field. Returns the stored value, or
    /// `None` if the text is not a number and nothing changed.
    pub fn apply_input(&mut self, name: &str, raw: &str) -> Option<u32> {
        let text = sanitize_input(raw, self.bounds)?;
        let value: f64 = text.trim_end_matches('.').parse().ok()?;
        Some(self.set(name, value))
    }

    /// Plain name → value map, as sent with `PLAY_SIMULATION`.
    pub fn to_map(&self) -> BTreeMap<String, u32> {
        self.iter().map(|(n, v)| (n.to_string(), v)).collect()
    }

    fn clamp(&self, value: f64) -> u32 {
        if value.is_nan() {
            return self.bounds.min;
        }
        value.clamp(self.bounds.min as f64, self.bounds.max as f64).trunc() as u32
    }
}

/// Field sanitising: above max becomes max, below min (or empty) becomes min,
/// and the result is cut to `max_digits` characters. Non-numbers are rejected.
pub fn sanitize_input(raw: &str, bounds: ParameterBounds) -> Option<String> {
    let raw = raw.trim();
    let number = if raw.is_empty() { 0.0 } else { raw.parse::<f64>().ok()? };
    if number.is_nan() {
        return None;
    }

    let text = if number > bounds.max as f64 {
        bounds.max.to_string()
    } else if number < bounds.min as f64 {
        bounds.min.to_string()
    } else {
        raw.to_string()
    };
    Some(text.chars().take(bounds.max_digits).collect())
}
