//! Conversions from core types to response bodies

use esxstat_api::responses::{BucketResponse, CycleError, CycleSummary, SensorResponse};
use esxstat_core::{BucketSnapshot, Category, CycleReport, PollError, Sensor};

pub fn bucket_response(
    category: Category,
    bucket: &BucketSnapshot,
) -> Result<BucketResponse, serde_json::Error> {
    let records = bucket
        .records
        .iter()
        .map(|(key, record)| Ok((key.clone(), serde_json::to_value(record)?)))
        .collect::<Result<_, serde_json::Error>>()?;

    Ok(BucketResponse {
        category: category.to_string(),
        refreshed_at: bucket.refreshed_at,
        count: bucket.records.len(),
        records,
    })
}

fn cycle_error(error: &PollError) -> CycleError {
    CycleError {
        kind: error.kind().to_string(),
        category: error.category().map(|c| c.to_string()),
        message: error.to_string(),
    }
}

pub fn cycle_summary(report: &CycleReport) -> CycleSummary {
    CycleSummary {
        started_at: report.started_at,
        finished_at: report.finished_at,
        refreshed: report
            .refreshed
            .iter()
            .map(|r| r.category.to_string())
            .collect(),
        errors: report.errors.iter().map(cycle_error).collect(),
    }
}

pub fn sensor_response(sensor: &Sensor) -> Result<SensorResponse, serde_json::Error> {
    let state = sensor
        .state
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    Ok(SensorResponse {
        entity_id: sensor.entity_id.clone(),
        name: sensor.name.clone(),
        category: sensor.category.to_string(),
        key: sensor.key.clone(),
        state,
        unit_of_measurement: sensor.unit_of_measurement.map(str::to_string),
        attributes: serde_json::to_value(&sensor.attributes)?,
    })
}
