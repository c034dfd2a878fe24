//! Capability → equipment requirements
//!
//! Deterministic, auditable table mapping each canonical capability to the
//! equipment that must be present for the claim to be credible (`required`)
//! and the equipment that is typical but not strictly necessary
//! (`recommended`). Drives LACKS and COULD_SUPPORT inference.

pub struct CapabilityRequirement {
    pub capability: &'static str,
    pub required: &'static [&'static str],
    pub recommended: &'static [&'static str],
}

const fn req(
    capability: &'static str,
    required: &'static [&'static str],
    recommended: &'static [&'static str],
) -> CapabilityRequirement {
    CapabilityRequirement {
        capability,
        required,
        recommended,
    }
}

pub const CAPABILITY_REQUIREMENTS: &[CapabilityRequirement] = &[
    req(
        "cataract_surgery",
        &[
            "operating_theatre",
            "operating_microscope",
            "autoclave",
            "anesthesia_machine",
        ],
        &[
            "phacoemulsification_machine",
            "a_scan_biometry",
            "slit_lamp",
            "keratometer",
        ],
    ),
    req(
        "general_surgery",
        &[
            "operating_theatre",
            "autoclave",
            "anesthesia_machine",
            "patient_monitor",
        ],
        &[
            "electrosurgical_unit",
            "suction_machine",
            "ventilator",
            "blood_bank",
            "oxygen_supply",
        ],
    ),
    req(
        "cesarean_section",
        &[
            "operating_theatre",
            "anesthesia_machine",
            "autoclave",
            "blood_bank",
            "patient_monitor",
        ],
        &["ventilator", "oxygen_supply", "incubator", "suction_machine"],
    ),
    req(
        "orthopedic_surgery",
        &[
            "operating_theatre",
            "anesthesia_machine",
            "autoclave",
            "xray_machine",
        ],
        &[
            "fluoroscopy",
            "patient_monitor",
            "electrosurgical_unit",
            "blood_bank",
        ],
    ),
    req(
        "eye_surgery",
        &[
            "operating_theatre",
            "operating_microscope",
            "autoclave",
            "anesthesia_machine",
        ],
        &["slit_lamp", "oct_machine", "visual_field_tester", "laser_machine"],
    ),
    req("dental_services", &["dental_chair"], &["dental_xray", "autoclave"]),
    req(
        "laparoscopic_surgery",
        &[
            "operating_theatre",
            "endoscope",
            "anesthesia_machine",
            "autoclave",
            "patient_monitor",
        ],
        &["electrosurgical_unit", "suction_machine", "ventilator"],
    ),
    req(
        "cardiac_surgery",
        &[
            "operating_theatre",
            "anesthesia_machine",
            "ventilator",
            "patient_monitor",
            "blood_bank",
            "defibrillator",
        ],
        &["cath_lab", "ecg_machine", "oxygen_supply", "ultrasound"],
    ),
    req(
        "neurosurgery",
        &[
            "operating_theatre",
            "operating_microscope",
            "anesthesia_machine",
            "ventilator",
            "patient_monitor",
            "ct_scanner",
        ],
        &["mri_scanner", "electrosurgical_unit", "blood_bank"],
    ),
    req(
        "plastic_surgery",
        &[
            "operating_theatre",
            "anesthesia_machine",
            "autoclave",
            "operating_microscope",
        ],
        &["electrosurgical_unit", "suction_machine"],
    ),
    req(
        "urology_surgery",
        &[
            "operating_theatre",
            "anesthesia_machine",
            "autoclave",
            "endoscope",
        ],
        &["ultrasound", "xray_machine", "fluoroscopy"],
    ),
    req(
        "endoscopy",
        &["endoscope", "patient_monitor"],
        &["suction_machine", "anesthesia_machine", "autoclave"],
    ),
    req(
        "laboratory_services",
        &["laboratory"],
        &["microscope", "hematology_analyzer", "chemistry_analyzer"],
    ),
    req("xray_imaging", &["xray_machine"], &[]),
    req("ultrasound_imaging", &["ultrasound"], &[]),
    req("ct_imaging", &["ct_scanner"], &[]),
    req("mri_imaging", &["mri_scanner"], &[]),
    req("ecg_services", &["ecg_machine"], &[]),
    req(
        "eye_examination",
        &["slit_lamp"],
        &["visual_field_tester", "oct_machine", "fundus_camera", "keratometer"],
    ),
    req(
        "emergency_services",
        &["defibrillator", "patient_monitor", "oxygen_supply"],
        &["ventilator", "suction_machine", "xray_machine", "ambulance"],
    ),
    req(
        "icu_services",
        &["ventilator", "patient_monitor", "oxygen_supply", "infusion_pump"],
        &["defibrillator", "suction_machine", "ecg_machine"],
    ),
    req(
        "nicu_services",
        &["incubator", "patient_monitor", "oxygen_supply"],
        &["ventilator", "infusion_pump", "pulse_oximeter"],
    ),
    req(
        "maternity_services",
        &["ultrasound"],
        &["patient_monitor", "incubator", "oxygen_supply"],
    ),
    req("family_planning", &[], &["ultrasound"]),
    req(
        "dialysis",
        &["dialysis_machine", "patient_monitor"],
        &["laboratory", "oxygen_supply"],
    ),
    req(
        "chemotherapy",
        &["infusion_pump", "patient_monitor", "laboratory"],
        &["pharmacy"],
    ),
    req(
        "radiotherapy",
        &["radiation_therapy"],
        &["ct_scanner", "patient_monitor"],
    ),
    req("physiotherapy", &["physiotherapy_equipment"], &[]),
    req("hiv_treatment", &["laboratory"], &["pharmacy"]),
    req("mental_health", &[], &["pharmacy"]),
    req("vaccination", &[], &["pharmacy"]),
    req("outpatient_services", &[], &["pharmacy", "laboratory"]),
    req(
        "inpatient_services",
        &["patient_monitor"],
        &["pharmacy", "laboratory", "oxygen_supply"],
    ),
    req(
        "pediatric_care",
        &[],
        &["patient_monitor", "incubator", "pharmacy"],
    ),
    req("pharmacy_services", &["pharmacy"], &[]),
];

/// Look up the requirement entry for a capability
pub fn requirements_for(capability: &str) -> Option<&'static CapabilityRequirement> {
    CAPABILITY_REQUIREMENTS
        .iter()
        .find(|r| r.capability == capability)
}
