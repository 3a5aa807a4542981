//! Sensor emulator
//!
//! Generates synthetic temperature and humidity readings, publishes them on
//! a fixed schedule and mirrors every successful publication into the
//! outbound relay so the dashboard can show it.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

use crate::cancel::CancelToken;
use crate::relay::{Event, EventSender};
use crate::topics::{Sensor, TopicSet};
use crate::transport::{Publisher, TransportError};

const TEMPERATURE: RangeInclusive<f64> = 20.0..=25.0;
const HUMIDITY: RangeInclusive<f64> = 30.0..=60.0;
const AIR_HUMIDITY: RangeInclusive<f64> = 40.0..=80.0;

/// What to do when a publish call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log, skip that value, keep the schedule.
    #[default]
    LogAndContinue,
    /// Stop the emulator and hand the error back.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Pause between the publications of one cycle.
    pub between: Duration,
    /// Pause after the last publication of a cycle.
    pub cycle: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule {
            between: Duration::from_millis(100),
            cycle: Duration::from_secs(30),
        }
    }
}

/// One cycle worth of readings, already rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub temperature: f64,
    pub humidity: f64,
    pub air_humidity: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl Readings {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Readings {
        Readings {
            temperature: round2(rng.random_range(TEMPERATURE)),
            humidity: round2(rng.random_range(HUMIDITY)),
            air_humidity: round2(rng.random_range(AIR_HUMIDITY)),
        }
    }

    pub fn value(&self, sensor: Sensor) -> f64 {
        match sensor {
            Sensor::Temperature => self.temperature,
            Sensor::Humidity => self.humidity,
            Sensor::AirHumidity => self.air_humidity,
        }
    }

    /// Payload text for one sensor, always with two decimals.
    pub fn payload(&self, sensor: Sensor) -> String {
        format!("{:.2}", self.value(sensor))
    }
}

pub struct SensorEmulator<P, R> {
    publisher: P,
    topics: TopicSet,
    outbound: EventSender,
    schedule: Schedule,
    policy: FailurePolicy,
    rng: R,
}

impl<P: Publisher, R: Rng> SensorEmulator<P, R> {
    pub fn new(
        publisher: P,
        topics: TopicSet,
        outbound: EventSender,
        schedule: Schedule,
        policy: FailurePolicy,
        rng: R,
    ) -> Self {
        Self {
            publisher,
            topics,
            outbound,
            schedule,
            policy,
            rng,
        }
    }

    /// Runs cycles until `cancel` fires (`Ok`) or, under
    /// [`FailurePolicy::Stop`], a publish fails (`Err`).
    pub fn run(&mut self, cancel: &CancelToken) -> Result<(), TransportError> {
        tracing::info!(
            between = ?self.schedule.between,
            cycle = ?self.schedule.cycle,
            "sensor emulator started"
        );
        loop {
            let readings = Readings::sample(&mut self.rng);
            if !self.publish_cycle(&readings, cancel)? {
                break;
            }
            if !cancel.sleep(self.schedule.cycle) {
                break;
            }
        }
        tracing::info!("sensor emulator stopped");
        Ok(())
    }

    /// Publishes one set of readings with the short pause between values.
    /// Returns `Ok(false)` if cancelled part way.
    pub fn publish_cycle(
        &mut self,
        readings: &Readings,
        cancel: &CancelToken,
    ) -> Result<bool, TransportError> {
        for (i, sensor) in Sensor::ALL.into_iter().enumerate() {
            if i > 0 && !cancel.sleep(self.schedule.between) {
                return Ok(false);
            }
            self.publish_one(sensor, readings)?;
        }
        Ok(true)
    }

    fn publish_one(&mut self, sensor: Sensor, readings: &Readings) -> Result<(), TransportError> {
        let topic = self.topics.sensor(sensor);
        let payload = readings.payload(sensor);

        match self.publisher.publish(topic, &payload) {
            Ok(()) => {
                tracing::debug!(%topic, %payload, "published");
                // The dashboard going away must not stop publishing.
                if self.outbound.send(Event::new(topic, payload)).is_err() {
                    tracing::debug!("outbound relay closed");
                }
                Ok(())
            }
            Err(e) => match self.policy {
                FailurePolicy::LogAndContinue => {
                    tracing::warn!(%topic, error = %e, "publish failed, skipping value");
                    Ok(())
                }
                FailurePolicy::Stop => {
                    tracing::error!(%topic, error = %e, "publish failed, stopping emulator");
                    Err(e)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{self, Capacity, RecvError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<(String, String)>>,
        fail_on: Option<&'static str>,
    }

    impl Publisher for Recorder {
        fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
            if self.fail_on.is_some_and(|suffix| topic.ends_with(suffix)) {
                return Err(TransportError::Disconnected);
            }
            self.sent
                .borrow_mut()
                .push((topic.to_string(), payload.to_string()));
            Ok(())
        }
    }

    fn instant() -> Schedule {
        Schedule {
            between: Duration::ZERO,
            cycle: Duration::ZERO,
        }
    }

    fn readings() -> Readings {
        Readings {
            temperature: 23.45,
            humidity: 42.1,
            air_humidity: 60.0,
        }
    }

    #[test]
    fn samples_stay_in_range_with_two_decimals() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let r = Readings::sample(&mut rng);
            assert!(TEMPERATURE.contains(&r.temperature));
            assert!(HUMIDITY.contains(&r.humidity));
            assert!(AIR_HUMIDITY.contains(&r.air_humidity));
            for sensor in Sensor::ALL {
                let v = r.value(sensor);
                assert!((v * 100.0 - (v * 100.0).round()).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn payload_keeps_trailing_zero() {
        assert_eq!(readings().payload(Sensor::Humidity), "42.10");
        assert_eq!(readings().payload(Sensor::AirHumidity), "60.00");
    }

    #[test]
    fn cycle_publishes_in_order_and_mirrors() {
        let (tx, rx) = relay::channel(Capacity::Unbounded);
        let topics = TopicSet::from_base("b");
        let recorder = Recorder::default();
        let mut emu = SensorEmulator::new(
            &recorder,
            topics,
            tx,
            instant(),
            FailurePolicy::Stop,
            StdRng::seed_from_u64(1),
        );

        assert!(emu.publish_cycle(&readings(), &CancelToken::new()).unwrap());

        let expected = [("b/temp", "23.45"), ("b/hum", "42.10"), ("b/air_hum", "60.00")];
        let sent = recorder.sent.borrow();
        for (i, (topic, payload)) in expected.iter().enumerate() {
            assert_eq!(sent[i], (topic.to_string(), payload.to_string()));
            let ev = rx.try_recv().unwrap();
            assert_eq!((ev.topic.as_str(), ev.payload.as_str()), (*topic, *payload));
        }
        assert_eq!(rx.try_recv(), Err(RecvError::Empty));
    }

    #[test]
    fn failed_publish_is_skipped_when_continuing() {
        let (tx, rx) = relay::channel(Capacity::Unbounded);
        let recorder = Recorder {
            fail_on: Some("/hum"),
            ..Default::default()
        };
        let mut emu = SensorEmulator::new(
            &recorder,
            TopicSet::from_base("b"),
            tx,
            instant(),
            FailurePolicy::LogAndContinue,
            StdRng::seed_from_u64(1),
        );

        assert!(emu.publish_cycle(&readings(), &CancelToken::new()).unwrap());
        assert_eq!(rx.try_recv().unwrap().topic, "b/temp");
        assert_eq!(rx.try_recv().unwrap().topic, "b/air_hum");
        assert_eq!(rx.try_recv(), Err(RecvError::Empty));
    }

    #[test]
    fn failed_publish_stops_when_asked() {
        let (tx, rx) = relay::channel(Capacity::Unbounded);
        let recorder = Recorder {
            fail_on: Some("/hum"),
            ..Default::default()
        };
        let mut emu = SensorEmulator::new(
            &recorder,
            TopicSet::from_base("b"),
            tx,
            instant(),
            FailurePolicy::Stop,
            StdRng::seed_from_u64(1),
        );

        let err = emu.run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
        assert_eq!(rx.try_recv().unwrap().topic, "b/temp");
        assert_eq!(rx.try_recv(), Err(RecvError::Empty));
    }

    #[test]
    fn cancelled_token_stops_before_second_value() {
        let (tx, rx) = relay::channel(Capacity::Unbounded);
        let recorder = Recorder::default();
        let mut emu = SensorEmulator::new(
            &recorder,
            TopicSet::from_base("b"),
            tx,
            Schedule::default(),
            FailurePolicy::Stop,
            StdRng::seed_from_u64(1),
        );
        let cancel = CancelToken::new();
        cancel.cancel();

        assert!(emu.run(&cancel).is_ok());
        assert_eq!(recorder.sent.borrow().len(), 1);
        assert!(rx.try_recv().is_ok());
        assert_eq!(rx.try_recv(), Err(RecvError::Empty));
    }
}
