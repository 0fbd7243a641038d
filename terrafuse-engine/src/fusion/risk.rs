// Risk Consensus - union of both detection methods plus cross-method intersection
//
// No deduplication: two methods flagging the same hazard is corroboration and both
// records are kept. `consensus_risks` holds every record whose type was flagged by
// both methods.

use crate::fusion::CombinedRisks;
use crate::types::{DetectionMethod, EnvironmentalReading, RiskRecord, RiskType, Severity};
use std::collections::HashSet;
use tracing::{debug, info};

/// Derive risks from a traditional reading
///
/// Each rule fires only when its field is present.
pub fn detect_traditional_risks(reading: &EnvironmentalReading) -> Vec<RiskRecord> {
    let mut risks = Vec::new();

    if let Some(aqi) = reading.aqi {
        if aqi > 100.0 {
            let severity = if aqi > 150.0 { Severity::High } else { Severity::Moderate };
            risks.push(traditional(RiskType::AirPollution, severity, format!("AQI {:.0}", aqi)));
        }
    }

    if let Some(temp) = reading.temperature_c {
        if temp > 35.0 || temp < -10.0 {
            let severity = if temp > 40.0 || temp < -20.0 {
                Severity::High
            } else {
                Severity::Moderate
            };
            risks.push(traditional(
                RiskType::TemperatureStress,
                severity,
                format!("Air temperature {:.1} °C", temp),
            ));
        }
    }

    if let Some(veg) = reading.vegetation_health {
        if veg < 30.0 {
            let severity = if veg < 15.0 { Severity::High } else { Severity::Moderate };
            risks.push(traditional(
                RiskType::VegetationDecline,
                severity,
                format!("Vegetation health {:.0}%", veg),
            ));
        }
    }

    debug!("Detected {} traditional risks", risks.len());
    risks
}

fn traditional(risk_type: RiskType, severity: Severity, description: String) -> RiskRecord {
    RiskRecord::new(risk_type, severity, DetectionMethod::Traditional).with_description(description)
}

/// Combine traditional and vision risk lists
///
/// Vision records are re-tagged with `DetectionMethod::Vision` on entry so a
/// provider cannot misattribute provenance.
pub fn combine_risks(traditional: Vec<RiskRecord>, vision: &[RiskRecord]) -> CombinedRisks {
    let mut all = traditional;
    all.extend(vision.iter().cloned().map(|mut r| {
        r.detection_method = DetectionMethod::Vision;
        r
    }));

    let overall_level = overall_level(all.len());

    let types_by = |method: DetectionMethod| -> HashSet<RiskType> {
        all.iter()
            .filter(|r| r.detection_method == method)
            .map(|r| r.risk_type)
            .collect()
    };
    let traditional_types = types_by(DetectionMethod::Traditional);
    let vision_types = types_by(DetectionMethod::Vision);

    let consensus_risks: Vec<RiskRecord> = all
        .iter()
        .filter(|r| traditional_types.contains(&r.risk_type) && vision_types.contains(&r.risk_type))
        .cloned()
        .collect();

    if !consensus_risks.is_empty() {
        info!(
            "{} risk records corroborated by both detection methods",
            consensus_risks.len()
        );
    }

    CombinedRisks {
        all,
        overall_level,
        consensus_risks,
    }
}

/// Combined risk level from the number of detected risks
pub fn overall_level(count: usize) -> Severity {
    match count {
        0 => Severity::Low,
        1 | 2 => Severity::Moderate,
        _ => Severity::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::reading;

    #[test]
    fn test_traditional_thresholds() {
        let r = reading(Some(160.0), Some(38.0), Some(10.0));

        let risks = detect_traditional_risks(&r);
        let summary: Vec<_> = risks.iter().map(|r| (r.risk_type, r.severity)).collect();
        assert_eq!(
            summary,
            vec![
                (RiskType::AirPollution, Severity::High),
                (RiskType::TemperatureStress, Severity::Moderate),
                (RiskType::VegetationDecline, Severity::High),
            ]
        );
        assert!(risks.iter().all(|r| r.detection_method == DetectionMethod::Traditional));
    }

    #[test]
    fn test_water_and_uv_fields_raise_no_risk() {
        let mut r = reading(Some(40.0), Some(22.0), Some(70.0));
        r.water_quality = Some(5.0);
        r.uv_index = Some(12.0);
        assert!(detect_traditional_risks(&r).is_empty());
    }

    #[test]
    fn test_absent_fields_detect_nothing() {
        assert!(detect_traditional_risks(&reading(None, None, None)).is_empty());
    }

    #[test]
    fn test_cold_stress() {
        let risks = detect_traditional_risks(&reading(None, Some(-25.0), None));
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].severity, Severity::High);
    }

    #[test]
    fn test_union_preserves_duplicates() {
        let trad = vec![RiskRecord::new(
            RiskType::VegetationDecline,
            Severity::Moderate,
            DetectionMethod::Traditional,
        )];
        let vision = vec![RiskRecord::new(
            RiskType::VegetationDecline,
            Severity::High,
            DetectionMethod::Vision,
        )];

        let combined = combine_risks(trad, &vision);
        assert_eq!(combined.all.len(), 2);
        assert_eq!(combined.consensus_risks.len(), 2);
        assert_eq!(combined.overall_level, Severity::Moderate);
    }

    #[test]
    fn test_consensus_excludes_single_method_types() {
        let trad = vec![
            RiskRecord::new(RiskType::AirPollution, Severity::High, DetectionMethod::Traditional),
            RiskRecord::new(RiskType::WaterStress, Severity::Moderate, DetectionMethod::Traditional),
        ];
        let vision = vec![
            RiskRecord::new(RiskType::Deforestation, Severity::High, DetectionMethod::Vision),
            RiskRecord::new(RiskType::WaterStress, Severity::High, DetectionMethod::Vision),
        ];

        let combined = combine_risks(trad, &vision);
        assert_eq!(combined.all.len(), 4);
        assert_eq!(combined.overall_level, Severity::High);
        assert!(combined
            .consensus_risks
            .iter()
            .all(|r| r.risk_type == RiskType::WaterStress));
        assert_eq!(combined.consensus_risks.len(), 2);
    }

    #[test]
    fn test_vision_records_retagged() {
        let vision = vec![RiskRecord::new(
            RiskType::UrbanPressure,
            Severity::Moderate,
            DetectionMethod::Traditional,
        )];
        let combined = combine_risks(vec![], &vision);
        assert_eq!(combined.all[0].detection_method, DetectionMethod::Vision);
        assert!(combined.consensus_risks.is_empty());
    }

    #[test]
    fn test_overall_level_buckets() {
        assert_eq!(overall_level(0), Severity::Low);
        assert_eq!(overall_level(1), Severity::Moderate);
        assert_eq!(overall_level(2), Severity::Moderate);
        assert_eq!(overall_level(3), Severity::High);
    }
}
