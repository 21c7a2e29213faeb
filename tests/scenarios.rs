//! End-to-end monitoring scenarios through the public engine API.

use chrono::{DateTime, Duration, TimeZone, Utc};

use wardwatch_lib::config::MonitorConfig;
use wardwatch_lib::models::{
    Direction, FindingCategory, LabResult, PatientSnapshot, Severity, VitalParameter, VitalSigns,
};
use wardwatch_lib::monitor::{DefaultMonitorEngine, MonitorEngine, MonitorEvent};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

fn engine() -> DefaultMonitorEngine {
    DefaultMonitorEngine::new(MonitorConfig::default())
}

fn with_heart_rate(id: &str, bpm: f64) -> PatientSnapshot {
    PatientSnapshot::new(id, "Ada Lovelace")
        .with_vitals(VitalSigns::default().with(VitalParameter::HeartRate, bpm))
}

#[test]
fn scenario_a_critical_tachycardia() {
    let engine = engine();
    let summary = engine.evaluate_at(&[with_heart_rate("p1", 160.0)], t0()).unwrap();

    assert_eq!(summary.new_alerts.len(), 1);
    let alert = &summary.new_alerts[0];
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(alert.category, FindingCategory::Vitals);
    assert_eq!(alert.direction, Some(Direction::High));
    assert_eq!(alert.threshold, Some(150.0));
    assert!(alert.message.to_lowercase().contains("tachycardia"));
    assert!(!alert.acknowledged);
}

#[test]
fn scenario_b_spo2_drop_raises_absolute_and_trend_alerts() {
    let engine = engine();
    let patient = PatientSnapshot::new("p1", "Ada Lovelace")
        .with_vitals(VitalSigns::default().with(VitalParameter::Spo2, 97.0))
        .with_new_round(VitalSigns::default().with(VitalParameter::Spo2, 90.0));

    let summary = engine.evaluate_at(&[patient], t0()).unwrap();

    assert_eq!(summary.new_alerts.len(), 2);
    let absolute = summary
        .new_alerts
        .iter()
        .find(|a| a.parameter_key == "spo2")
        .expect("absolute SpO2 alert");
    assert_eq!(absolute.severity, Severity::Warning);
    assert_eq!(absolute.direction, Some(Direction::Low));

    let trend = summary
        .new_alerts
        .iter()
        .find(|a| a.parameter_key == "spo2-trend")
        .expect("SpO2 trend alert");
    assert_eq!(trend.severity, Severity::Warning);
    assert_eq!(trend.category, FindingCategory::Trend);
}

#[test]
fn scenario_c_persisting_condition_alerts_once() {
    let engine = engine();
    let roster = [with_heart_rate("p1", 160.0)];

    let raised: usize = (0..3)
        .map(|tick| {
            engine
                .evaluate_at(&roster, t0() + Duration::seconds(10 * tick))
                .unwrap()
                .new_alerts
                .len()
        })
        .sum();

    assert_eq!(raised, 1);
    assert_eq!(engine.alerts().unwrap().len(), 1);
}

#[test]
fn scenario_d_critical_potassium() {
    let engine = engine();
    let patient = PatientSnapshot::new("p1", "Ada Lovelace")
        .with_lab(LabResult::new("Potassium", 6.8).flagged(true, true));

    let summary = engine.evaluate_at(&[patient], t0()).unwrap();

    assert_eq!(summary.new_alerts.len(), 1);
    assert_eq!(summary.new_alerts[0].severity, Severity::Critical);
    assert_eq!(summary.new_alerts[0].category, FindingCategory::Lab);
}

#[test]
fn warning_escalating_to_critical_alerts_immediately() {
    let engine = engine();
    engine.evaluate_at(&[with_heart_rate("p1", 130.0)], t0()).unwrap();
    let summary = engine
        .evaluate_at(&[with_heart_rate("p1", 155.0)], t0() + Duration::seconds(20))
        .unwrap();

    assert_eq!(summary.new_alerts.len(), 1);
    assert_eq!(summary.new_alerts[0].severity, Severity::Critical);
}

#[test]
fn acknowledge_all_twice_keeps_zero_unacknowledged() {
    let engine = engine();
    engine
        .evaluate_at(&[with_heart_rate("p1", 160.0), with_heart_rate("p2", 35.0)], t0())
        .unwrap();
    assert_eq!(engine.counts().unwrap().total_unacknowledged, 2);

    engine.acknowledge_all().unwrap();
    engine.acknowledge_all().unwrap();

    let counts = engine.counts().unwrap();
    assert_eq!(counts.total_unacknowledged, 0);
    assert_eq!(counts.critical, 2);
}

#[test]
fn subscribers_see_every_new_alert() {
    let engine = engine();
    let mut rx = engine.subscribe();
    engine
        .evaluate_at(&[with_heart_rate("p1", 130.0), with_heart_rate("p2", 125.0)], t0())
        .unwrap();

    let mut raised = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let MonitorEvent::AlertRaised { alert } = event {
            raised.push(alert.patient_id);
        }
    }
    assert_eq!(raised, ["p1", "p2"]);
}

#[test]
fn one_bad_patient_does_not_block_the_ward() {
    let engine = engine();
    let bad = PatientSnapshot::new("p1", "Ada Lovelace")
        .with_vitals(VitalSigns::default().with(VitalParameter::HeartRate, f64::INFINITY));
    let summary = engine
        .evaluate_at(&[bad, with_heart_rate("p2", 160.0)], t0())
        .unwrap();

    assert_eq!(summary.patients_skipped, 1);
    assert_eq!(summary.new_alerts.len(), 1);
    assert_eq!(summary.new_alerts[0].patient_id, "p2");
}
