use lead_pipeline::workflows::leads::{
    BatchProcessor, DropReason, LeadService, LeadServiceError, LeadStatus, RawLead, Ruleset,
    RulesError, RulesStore,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lead-pipeline-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn valid_and_contactless_leads_split_into_ok_and_dropped() {
    let processor = BatchProcessor::new(Arc::new(RulesStore::default()));

    let outcome = processor.process(vec![
        RawLead {
            name: Some("Alex Doe".to_string()),
            email: Some("alex@sampleco.com".to_string()),
            company: Some("SampleCo".to_string()),
            ..RawLead::default()
        },
        RawLead {
            name: Some("No Contact".to_string()),
            email: Some("nope".to_string()),
            ..RawLead::default()
        },
    ]);

    assert_eq!(outcome.results[0].status, LeadStatus::Ok);
    assert_eq!(outcome.results[1].status, LeadStatus::Dropped);
    assert_eq!(
        outcome.results[1].drop_reason,
        Some(DropReason::NoValidContact)
    );
    assert_eq!(outcome.summary.count_out, 1);
    assert!((outcome.summary.fraction_enriched - 0.5).abs() < f64::EPSILON);
    assert_eq!(
        outcome.summary.avg_score,
        outcome.results[0].score as f64
    );
}

#[test]
fn accepted_rules_are_persisted_and_reloaded() {
    let dir = scratch_dir("persist");
    let path = dir.join("rules.json");

    let initial = Ruleset::load_or_init(&path).expect("defaults written");
    assert_eq!(initial, Ruleset::default());

    let service = LeadService::new(Arc::new(RulesStore::new(initial).expect("valid")))
        .with_rules_path(&path);
    let installed = service
        .replace_rules(json!({
            "title_includes": { "founder": 30 },
            "penalties": { "missing_company": 2 }
        }))
        .expect("accepted");
    assert_eq!(installed.version, 2);

    let reloaded = Ruleset::read(&path).expect("reload");
    assert_eq!(reloaded, *installed);
    assert_eq!(reloaded.title_includes.get("founder"), Some(&30));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejected_rules_leave_the_persisted_file_alone() {
    let dir = scratch_dir("reject");
    let path = dir.join("rules.json");
    let initial = Ruleset::load_or_init(&path).expect("defaults written");
    let before = std::fs::read_to_string(&path).expect("read");

    let service = LeadService::new(Arc::new(RulesStore::new(initial).expect("valid")))
        .with_rules_path(&path);
    let error = service
        .replace_rules(json!({
            "company_size_points": [{ "min": 9, "max": 1, "points": 1 }]
        }))
        .unwrap_err();

    assert!(matches!(
        error,
        LeadServiceError::Rules(RulesError::InvertedBand { min: 9, max: 1 })
    ));
    assert_eq!(std::fs::read_to_string(&path).expect("read"), before);
    assert_eq!(service.rules().version, 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn batches_score_consistently_while_rules_change() {
    let store = Arc::new(RulesStore::default());
    let processor = BatchProcessor::new(Arc::clone(&store));
    let batch: Vec<RawLead> = (0..50)
        .map(|index| RawLead {
            email: Some(format!("lead{index}@example.com")),
            title: Some("Engineer".to_string()),
            company: Some("Example".to_string()),
            ..RawLead::default()
        })
        .collect();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for points in 1..=20 {
                let mut ruleset = (*store.get()).clone();
                ruleset.title_includes.insert("engineer".to_string(), points * 100);
                store.replace(ruleset).expect("valid ruleset");
            }
        })
    };

    for _ in 0..20 {
        let outcome = processor.process(batch.clone());
        let bonus = outcome.results[0]
            .score_components
            .iter()
            .find(|component| component.notes.contains("engineer"))
            .map(|component| component.points)
            .unwrap_or(0);
        let expected = if outcome.rules_version == 1 {
            0
        } else {
            (outcome.rules_version as i64 - 1) * 100
        };

        assert_eq!(bonus, expected);
        for lead in &outcome.results {
            let lead_bonus = lead
                .score_components
                .iter()
                .find(|component| component.notes.contains("engineer"))
                .map(|component| component.points)
                .unwrap_or(0);
            assert_eq!(lead_bonus, bonus);
        }
    }

    writer.join().expect("writer");
    assert_eq!(store.version(), 21);
}
