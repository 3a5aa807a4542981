//! Fixed topic namespace under a per-device base path.

/// The emulated sensors, in publication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    Temperature,
    Humidity,
    AirHumidity,
}

impl Sensor {
    pub const ALL: [Sensor; 3] = [Sensor::Temperature, Sensor::Humidity, Sensor::AirHumidity];

    pub fn suffix(self) -> &'static str {
        match self {
            Sensor::Temperature => "temp",
            Sensor::Humidity => "hum",
            Sensor::AirHumidity => "air_hum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    temperature: String,
    humidity: String,
    air_humidity: String,
    light: String,
}

impl TopicSet {
    pub fn from_base(base: &str) -> TopicSet {
        let base = base.trim_end_matches('/');
        TopicSet {
            temperature: format!("{}/{}", base, Sensor::Temperature.suffix()),
            humidity: format!("{}/{}", base, Sensor::Humidity.suffix()),
            air_humidity: format!("{}/{}", base, Sensor::AirHumidity.suffix()),
            light: format!("{}/light", base),
        }
    }

    pub fn sensor(&self, sensor: Sensor) -> &str {
        match sensor {
            Sensor::Temperature => &self.temperature,
            Sensor::Humidity => &self.humidity,
            Sensor::AirHumidity => &self.air_humidity,
        }
    }

    /// Topic the dashboard subscribes to for on/off commands.
    pub fn light(&self) -> &str {
        &self.light
    }
}
