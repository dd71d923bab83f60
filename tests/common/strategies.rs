use proptest::prelude::*;
use proptest::strategy::Just;
use trial_match_core::models::{
    CriteriaSet, Criterion, CriterionCategory, DiseaseStage, EvidenceProfile,
};

/// Strategy for generating criterion category tags
pub fn category_strategy() -> impl Strategy<Value = CriterionCategory> {
    prop_oneof![
        Just(CriterionCategory::Diagnosis),
        Just(CriterionCategory::Biomarker),
        Just(CriterionCategory::Treatment),
        Just(CriterionCategory::Demographics),
        Just(CriterionCategory::Other),
    ]
}

pub fn stage_strategy() -> impl Strategy<Value = DiseaseStage> {
    prop_oneof![
        Just(DiseaseStage::Unknown),
        Just(DiseaseStage::I),
        Just(DiseaseStage::II),
        Just(DiseaseStage::III),
        Just(DiseaseStage::IV),
    ]
}

/// Criterion text drawn from realistic phrasing, so matches actually occur
pub fn criterion_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Histologically confirmed non-small cell lung cancer".to_string()),
        Just("Documented EGFR exon 19 deletion".to_string()),
        Just("ALK rearrangement".to_string()),
        Just("Stage IIIB-IV disease".to_string()),
        Just("Stage I or II disease".to_string()),
        Just("ECOG performance status 0-1".to_string()),
        Just("ECOG 2 or higher".to_string()),
        Just("Prior carboplatin".to_string()),
        Just("Prior immunotherapy".to_string()),
        Just("Age 18 years or older".to_string()),
        Just("Adequate organ function".to_string()),
        "[a-zA-Z ]{0,40}",
    ]
}

pub fn criterion_strategy() -> impl Strategy<Value = Criterion> {
    (criterion_text_strategy(), category_strategy())
        .prop_map(|(text, category)| Criterion::new(text, category))
}

pub fn criteria_set_strategy() -> impl Strategy<Value = CriteriaSet> {
    (
        prop::collection::vec(criterion_strategy(), 0..8),
        prop::collection::vec(criterion_strategy(), 0..5),
    )
        .prop_map(|(inclusion, exclusion)| {
            let mut criteria = CriteriaSet::new("NCT00000001");
            criteria.inclusion = inclusion;
            criteria.exclusion = exclusion;
            criteria
        })
}

pub fn profile_strategy() -> impl Strategy<Value = EvidenceProfile> {
    (
        prop_oneof![
            Just("Non-small cell lung cancer"),
            Just("Melanoma"),
            Just("Breast cancer"),
        ],
        stage_strategy(),
        prop::collection::btree_set(
            prop_oneof![Just("EGFR exon 19 deletion"), Just("ALK"), Just("BRAF V600E")],
            0..3,
        ),
        0u8..=4,
        prop::collection::btree_set(
            prop_oneof![Just("carboplatin"), Just("immunotherapy"), Just("surgery")],
            0..3,
        ),
    )
        .prop_map(|(condition, stage, biomarkers, performance_status, treatments)| {
            let mut profile = EvidenceProfile::new(condition, "94110")
                .with_stage(stage)
                .with_performance_status(performance_status);
            for biomarker in biomarkers {
                profile = profile.with_biomarker(biomarker);
            }
            for treatment in treatments {
                profile = profile.with_prior_treatment(treatment);
            }
            profile
        })
}
