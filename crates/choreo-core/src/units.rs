//! Unit-tagged quantities.
//!
//! Every quantity authored in a movie carries its unit. The compiler converts
//! to a single internal system (centimeters and seconds) before doing any
//! arithmetic, using the fixed factor attached to each unit variant.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    Meters,
    Centimeters,
    Kilometers,
    Feet,
}

impl DistanceUnit {
    /// Centimeters per one unit.
    pub fn factor(self) -> f64 {
        match self {
            DistanceUnit::Meters => 100.0,
            DistanceUnit::Centimeters => 1.0,
            DistanceUnit::Kilometers => 100_000.0,
            DistanceUnit::Feet => 30.48,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Centimeters => "cm",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Feet => "ft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Seconds per one unit.
    pub fn factor(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    MetersPerSecond,
    CentimetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
}

impl SpeedUnit {
    /// Centimeters per second per one unit.
    pub fn factor(self) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => 100.0,
            SpeedUnit::CentimetersPerSecond => 1.0,
            SpeedUnit::KilometersPerHour => 100_000.0 / 3600.0,
            SpeedUnit::MilesPerHour => 44.704,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            SpeedUnit::MetersPerSecond => "m/s",
            SpeedUnit::CentimetersPerSecond => "cm/s",
            SpeedUnit::KilometersPerHour => "km/h",
            SpeedUnit::MilesPerHour => "mph",
        }
    }
}

/// A length with its authoring unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    pub fn meters(value: f64) -> Self {
        Self::new(value, DistanceUnit::Meters)
    }

    pub fn centimeters(value: f64) -> Self {
        Self::new(value, DistanceUnit::Centimeters)
    }

    pub fn kilometers(value: f64) -> Self {
        Self::new(value, DistanceUnit::Kilometers)
    }

    pub fn feet(value: f64) -> Self {
        Self::new(value, DistanceUnit::Feet)
    }

    /// Value in centimeters.
    pub fn to_internal(&self) -> f64 {
        self.value * self.unit.factor()
    }

    /// Express an internal (centimeter) value in `unit`.
    pub fn from_internal(cm: f64, unit: DistanceUnit) -> Self {
        Self::new(cm / unit.factor(), unit)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.symbol())
    }
}

/// A time span with its authoring unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub value: f64,
    pub unit: TimeUnit,
}

impl TimeSpan {
    pub fn new(value: f64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub fn seconds(value: f64) -> Self {
        Self::new(value, TimeUnit::Seconds)
    }

    pub fn minutes(value: f64) -> Self {
        Self::new(value, TimeUnit::Minutes)
    }

    pub fn hours(value: f64) -> Self {
        Self::new(value, TimeUnit::Hours)
    }

    /// Value in seconds.
    pub fn to_internal(&self) -> f64 {
        self.value * self.unit.factor()
    }

    pub fn from_internal(seconds: f64, unit: TimeUnit) -> Self {
        Self::new(seconds / unit.factor(), unit)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.symbol())
    }
}

/// A speed with its authoring unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub value: f64,
    pub unit: SpeedUnit,
}

impl Speed {
    pub fn new(value: f64, unit: SpeedUnit) -> Self {
        Self { value, unit }
    }

    pub fn mps(value: f64) -> Self {
        Self::new(value, SpeedUnit::MetersPerSecond)
    }

    pub fn cmps(value: f64) -> Self {
        Self::new(value, SpeedUnit::CentimetersPerSecond)
    }

    pub fn kmh(value: f64) -> Self {
        Self::new(value, SpeedUnit::KilometersPerHour)
    }

    pub fn mph(value: f64) -> Self {
        Self::new(value, SpeedUnit::MilesPerHour)
    }

    /// Value in centimeters per second.
    pub fn to_internal(&self) -> f64 {
        self.value * self.unit.factor()
    }

    pub fn from_internal(cm_per_s: f64, unit: SpeedUnit) -> Self {
        Self::new(cm_per_s / unit.factor(), unit)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.symbol())
    }
}

/// Linear acceleration, authored in meters per second squared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    pub mps2: f64,
}

impl Acceleration {
    pub fn mps2(value: f64) -> Self {
        Self { mps2: value }
    }

    /// Value in centimeters per second squared.
    pub fn to_internal(&self) -> f64 {
        self.mps2 * 100.0
    }
}
