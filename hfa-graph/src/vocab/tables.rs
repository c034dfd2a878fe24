//! Canonical vocabularies
//!
//! Human-curated equipment and capability vocabularies. Each entry carries a
//! stable canonical key, a display name, a category, and lowercase aliases
//! for the keyword matcher. Editing a vocabulary changes [`vocab_version`]
//! and thereby invalidates the normalization cache.

use crate::vocab::Domain;
use sha2::{Digest, Sha256};

/// Complexity tier of a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// One canonical vocabulary entry
#[derive(Debug, Clone, Copy)]
pub struct VocabEntry {
    pub key: &'static str,
    pub display: &'static str,
    pub category: &'static str,
    /// Set for capabilities only
    pub complexity: Option<Complexity>,
    /// Lowercase alias phrases for keyword matching
    pub aliases: &'static [&'static str],
}

const fn equipment(
    key: &'static str,
    display: &'static str,
    category: &'static str,
    aliases: &'static [&'static str],
) -> VocabEntry {
    VocabEntry {
        key,
        display,
        category,
        complexity: None,
        aliases,
    }
}

const fn capability(
    key: &'static str,
    display: &'static str,
    category: &'static str,
    complexity: Complexity,
    aliases: &'static [&'static str],
) -> VocabEntry {
    VocabEntry {
        key,
        display,
        category,
        complexity: Some(complexity),
        aliases,
    }
}

pub const EQUIPMENT: &[VocabEntry] = &[
    equipment(
        "operating_theatre",
        "Operating Theatre",
        "surgical",
        &[
            "operating room",
            "operating theatre",
            "operating theater",
            "surgical theatre",
            "surgical theater",
            "surgical room",
            "theatre",
            "or suite",
            "surgical suite",
        ],
    ),
    equipment(
        "operating_microscope",
        "Operating Microscope",
        "surgical",
        &[
            "operating microscope",
            "surgical microscope",
            "microsurgery microscope",
        ],
    ),
    equipment(
        "autoclave",
        "Autoclave / Sterilizer",
        "surgical",
        &[
            "autoclave",
            "sterilizer",
            "sterilization",
            "sterilisation",
            "steam sterilizer",
        ],
    ),
    equipment(
        "anesthesia_machine",
        "Anesthesia Machine",
        "surgical",
        &[
            "anesthesia machine",
            "anaesthesia machine",
            "anesthesia equipment",
            "anaesthesia equipment",
            "anesthetic machine",
        ],
    ),
    equipment(
        "ventilator",
        "Ventilator",
        "surgical",
        &[
            "ventilator",
            "mechanical ventilator",
            "breathing machine",
            "respirator",
        ],
    ),
    equipment(
        "patient_monitor",
        "Patient Monitor",
        "monitoring",
        &[
            "patient monitor",
            "vital signs monitor",
            "cardiac monitor",
            "bedside monitor",
            "multiparameter monitor",
        ],
    ),
    equipment(
        "defibrillator",
        "Defibrillator",
        "surgical",
        &["defibrillator", "aed", "automated external defibrillator"],
    ),
    equipment(
        "suction_machine",
        "Suction Machine",
        "surgical",
        &[
            "suction machine",
            "suction apparatus",
            "suction pump",
            "surgical suction",
        ],
    ),
    equipment(
        "electrosurgical_unit",
        "Electrosurgical Unit",
        "surgical",
        &[
            "electrosurgical unit",
            "diathermy",
            "cautery",
            "electrocautery",
            "bovie",
            "surgical cautery",
        ],
    ),
    equipment(
        "xray_machine",
        "X-ray Machine",
        "imaging",
        &["x-ray", "xray", "x ray", "radiograph", "radiography"],
    ),
    equipment(
        "ct_scanner",
        "CT Scanner",
        "imaging",
        &[
            "ct scanner",
            "ct scan",
            "cat scan",
            "computed tomography",
            "ct machine",
            "ct imaging",
        ],
    ),
    equipment(
        "mri_scanner",
        "MRI Scanner",
        "imaging",
        &[
            "mri",
            "mri scanner",
            "mri machine",
            "magnetic resonance",
            "magnetic resonance imaging",
        ],
    ),
    equipment(
        "ultrasound",
        "Ultrasound Machine",
        "imaging",
        &[
            "ultrasound",
            "ultrasonography",
            "sonography",
            "sonogram",
            "ultrasound machine",
            "ultrasound device",
            "echo",
            "echocardiography",
            "doppler ultrasound",
        ],
    ),
    equipment(
        "mammography",
        "Mammography Machine",
        "imaging",
        &["mammography", "mammogram", "mammography machine"],
    ),
    equipment(
        "fluoroscopy",
        "Fluoroscopy",
        "imaging",
        &["fluoroscopy", "fluoroscope", "c-arm", "image intensifier"],
    ),
    equipment(
        "oct_machine",
        "OCT Machine",
        "imaging",
        &[
            "oct",
            "optical coherence tomography",
            "oct machine",
            "oct imaging",
            "macular oct",
        ],
    ),
    equipment(
        "fundus_camera",
        "Fundus Camera",
        "imaging",
        &[
            "fundus camera",
            "fundus photography",
            "retinal camera",
            "fundus fluorescein angiography",
            "ffa",
        ],
    ),
    equipment(
        "slit_lamp",
        "Slit Lamp",
        "imaging",
        &["slit lamp", "slit-lamp", "biomicroscope"],
    ),
    equipment(
        "visual_field_tester",
        "Visual Field Tester",
        "imaging",
        &[
            "visual field",
            "perimetry",
            "perimeter",
            "visual field testing",
            "humphrey",
            "goldmann",
        ],
    ),
    equipment(
        "b_scan_ultrasound",
        "B-Scan Ultrasound",
        "imaging",
        &["b-scan", "b scan", "ocular ultrasonography", "b-scan ultrasound"],
    ),
    equipment(
        "keratometer",
        "Keratometer",
        "imaging",
        &["keratometer", "keratoscopy", "keratoscope"],
    ),
    equipment(
        "a_scan_biometry",
        "A-Scan Biometry",
        "imaging",
        &["a-scan", "a scan", "biometry", "iol master", "a-scan biometry"],
    ),
    equipment(
        "dental_xray",
        "Dental X-ray",
        "imaging",
        &[
            "dental x-ray",
            "dental xray",
            "dental radiograph",
            "panoramic x-ray",
            "orthopantomogram",
            "opg",
        ],
    ),
    equipment(
        "ecg_machine",
        "ECG Machine",
        "monitoring",
        &[
            "ecg",
            "ekg",
            "electrocardiogram",
            "electrocardiograph",
            "ecg machine",
            "ekg machine",
        ],
    ),
    equipment(
        "laboratory",
        "Laboratory",
        "lab",
        &[
            "laboratory",
            "medical lab",
            "clinical lab",
            "lab facilities",
            "pathology lab",
            "diagnostic lab",
        ],
    ),
    equipment(
        "blood_bank",
        "Blood Bank",
        "lab",
        &[
            "blood bank",
            "blood transfusion",
            "blood storage",
            "transfusion services",
            "blood supply",
        ],
    ),
    equipment(
        "hematology_analyzer",
        "Hematology Analyzer",
        "lab",
        &[
            "hematology analyzer",
            "haematology analyzer",
            "cbc machine",
            "blood cell counter",
            "hematology",
        ],
    ),
    equipment(
        "chemistry_analyzer",
        "Chemistry Analyzer",
        "lab",
        &[
            "chemistry analyzer",
            "biochemistry analyzer",
            "clinical chemistry",
            "blood chemistry",
            "metabolic panel",
        ],
    ),
    equipment(
        "microscope",
        "Microscope",
        "lab",
        &["microscope", "light microscope", "lab microscope"],
    ),
    equipment(
        "oxygen_supply",
        "Oxygen Supply",
        "infrastructure",
        &[
            "oxygen",
            "oxygen supply",
            "piped oxygen",
            "oxygen plant",
            "oxygen concentrator",
            "oxygen generation",
            "o2",
        ],
    ),
    equipment(
        "pharmacy",
        "Pharmacy / Dispensary",
        "infrastructure",
        &["pharmacy", "dispensary", "drug dispensary", "on-site pharmacy"],
    ),
    equipment(
        "ambulance",
        "Ambulance",
        "infrastructure",
        &["ambulance", "emergency vehicle", "ambulance service"],
    ),
    equipment(
        "generator",
        "Backup Generator",
        "infrastructure",
        &[
            "generator",
            "backup generator",
            "backup power",
            "standby generator",
            "power backup",
            "diesel generator",
        ],
    ),
    equipment(
        "incubator",
        "Incubator",
        "infrastructure",
        &[
            "incubator",
            "neonatal incubator",
            "baby incubator",
            "infant incubator",
        ],
    ),
    equipment(
        "dialysis_machine",
        "Dialysis Machine",
        "therapeutic",
        &[
            "dialysis",
            "hemodialysis",
            "haemodialysis",
            "dialysis machine",
            "dialysis center",
            "dialysis unit",
            "renal dialysis",
        ],
    ),
    equipment(
        "phacoemulsification_machine",
        "Phacoemulsification Machine",
        "surgical",
        &[
            "phacoemulsification",
            "phaco",
            "phaco machine",
            "cataract phaco",
            "phacoemulsifier",
        ],
    ),
    equipment(
        "laser_machine",
        "Laser Machine",
        "surgical",
        &[
            "laser",
            "laser machine",
            "laser surgery",
            "laser equipment",
            "yag laser",
            "argon laser",
            "excimer laser",
            "laser eye",
        ],
    ),
    equipment(
        "endoscope",
        "Endoscope",
        "surgical",
        &[
            "endoscope",
            "endoscopy",
            "gastroscope",
            "colonoscope",
            "bronchoscope",
            "laparoscope",
            "laparoscopy",
            "arthroscope",
        ],
    ),
    equipment(
        "dental_chair",
        "Dental Chair / Unit",
        "surgical",
        &[
            "dental chair",
            "dental unit",
            "dental equipment",
            "dental facilities",
            "dental suite",
        ],
    ),
    equipment(
        "physiotherapy_equipment",
        "Physiotherapy Equipment",
        "therapeutic",
        &[
            "physiotherapy",
            "physical therapy",
            "rehabilitation equipment",
            "physio equipment",
            "rehab equipment",
        ],
    ),
    equipment(
        "radiation_therapy",
        "Radiation Therapy Equipment",
        "therapeutic",
        &[
            "radiation therapy",
            "radiotherapy",
            "linear accelerator",
            "linac",
            "cobalt 60",
            "brachytherapy",
        ],
    ),
    equipment(
        "nuclear_medicine",
        "Nuclear Medicine Equipment",
        "imaging",
        &[
            "nuclear medicine",
            "gamma camera",
            "spect",
            "pet scan",
            "pet-ct",
            "nuclear imaging",
        ],
    ),
    equipment(
        "eeg_machine",
        "EEG Machine",
        "monitoring",
        &[
            "eeg",
            "electroencephalogram",
            "electroencephalography",
            "eeg machine",
        ],
    ),
    equipment(
        "emg_machine",
        "EMG Machine",
        "monitoring",
        &["emg", "electromyography", "electromyogram", "nerve conduction"],
    ),
    equipment(
        "pulse_oximeter",
        "Pulse Oximeter",
        "monitoring",
        &["pulse oximeter", "oximeter", "spo2", "oxygen saturation monitor"],
    ),
    equipment(
        "infusion_pump",
        "Infusion Pump",
        "therapeutic",
        &["infusion pump", "iv pump", "syringe pump", "syringe driver"],
    ),
    equipment(
        "robotic_surgery",
        "Robotic Surgical System",
        "surgical",
        &[
            "robotic surgery",
            "da vinci",
            "surgical robot",
            "robotic surgical system",
        ],
    ),
    equipment(
        "cath_lab",
        "Catheterization Lab",
        "surgical",
        &[
            "cath lab",
            "catheterization lab",
            "cardiac catheterization",
            "cardiac cath",
            "angiography suite",
        ],
    ),
];

pub const CAPABILITIES: &[VocabEntry] = &[
    capability(
        "cataract_surgery",
        "Cataract Surgery",
        "surgical",
        Complexity::Medium,
        &[
            "cataract surgery",
            "cataract",
            "cataract removal",
            "phacoemulsification",
            "lens implant",
            "iol implant",
            "cataract extraction",
        ],
    ),
    capability(
        "general_surgery",
        "General Surgery",
        "surgical",
        Complexity::High,
        &[
            "general surgery",
            "surgical services",
            "major surgery",
            "minor surgery",
            "major and minor surgeries",
            "surgical operations",
        ],
    ),
    capability(
        "cesarean_section",
        "Cesarean Section",
        "maternity",
        Complexity::High,
        &[
            "cesarean",
            "caesarean",
            "c-section",
            "cesarean section",
            "caesarean section",
            "c section",
            "emergency cesarean",
        ],
    ),
    capability(
        "orthopedic_surgery",
        "Orthopedic Surgery",
        "surgical",
        Complexity::High,
        &[
            "orthopedic surgery",
            "orthopaedic surgery",
            "orthopedic",
            "fracture repair",
            "joint replacement",
            "bone surgery",
        ],
    ),
    capability(
        "eye_surgery",
        "Eye Surgery",
        "surgical",
        Complexity::High,
        &[
            "eye surgery",
            "ophthalmic surgery",
            "ocular surgery",
            "vitrectomy",
            "glaucoma surgery",
            "retinal surgery",
            "cornea transplant",
            "enucleation",
        ],
    ),
    capability(
        "dental_services",
        "Dental Services",
        "surgical",
        Complexity::Low,
        &[
            "dental services",
            "dental care",
            "dental treatment",
            "dentistry",
            "dental clinic",
            "dental extraction",
            "root canal",
            "filling",
            "dental filling",
        ],
    ),
    capability(
        "laparoscopic_surgery",
        "Laparoscopic Surgery",
        "surgical",
        Complexity::High,
        &[
            "laparoscopic",
            "laparoscopy",
            "minimally invasive surgery",
            "keyhole surgery",
        ],
    ),
    capability(
        "endoscopy",
        "Endoscopy",
        "diagnostic",
        Complexity::Medium,
        &[
            "endoscopy",
            "gastroscopy",
            "colonoscopy",
            "upper gi endoscopy",
            "lower gi endoscopy",
            "bronchoscopy",
        ],
    ),
    capability(
        "cardiac_surgery",
        "Cardiac Surgery",
        "surgical",
        Complexity::High,
        &[
            "cardiac surgery",
            "heart surgery",
            "open heart surgery",
            "bypass surgery",
            "cabg",
            "valve surgery",
            "valve replacement",
        ],
    ),
    capability(
        "neurosurgery",
        "Neurosurgery",
        "surgical",
        Complexity::High,
        &[
            "neurosurgery",
            "brain surgery",
            "craniotomy",
            "spinal surgery",
            "spine surgery",
        ],
    ),
    capability(
        "plastic_surgery",
        "Plastic Surgery",
        "surgical",
        Complexity::High,
        &[
            "plastic surgery",
            "reconstructive surgery",
            "cleft repair",
            "cleft lip",
            "cleft palate",
            "burn surgery",
            "skin graft",
        ],
    ),
    capability(
        "urology_surgery",
        "Urology Surgery",
        "surgical",
        Complexity::High,
        &[
            "urology surgery",
            "urological surgery",
            "prostatectomy",
            "lithotripsy",
            "cystoscopy",
            "kidney stone removal",
        ],
    ),
    capability(
        "laboratory_services",
        "Laboratory Services",
        "diagnostic",
        Complexity::Low,
        &[
            "laboratory services",
            "lab services",
            "lab testing",
            "laboratory testing",
            "blood test",
            "clinical laboratory",
            "diagnostic testing",
        ],
    ),
    capability(
        "xray_imaging",
        "X-ray Imaging",
        "diagnostic",
        Complexity::Low,
        &[
            "x-ray imaging",
            "xray imaging",
            "x-ray services",
            "radiography",
            "x-ray",
        ],
    ),
    capability(
        "ultrasound_imaging",
        "Ultrasound Imaging",
        "diagnostic",
        Complexity::Low,
        &[
            "ultrasound imaging",
            "ultrasound scan",
            "sonography",
            "ultrasound services",
            "obstetric ultrasound",
        ],
    ),
    capability(
        "ct_imaging",
        "CT Imaging",
        "diagnostic",
        Complexity::Medium,
        &["ct imaging", "ct scan", "ct services", "computed tomography"],
    ),
    capability(
        "mri_imaging",
        "MRI Imaging",
        "diagnostic",
        Complexity::Medium,
        &[
            "mri imaging",
            "mri scan",
            "mri services",
            "magnetic resonance imaging",
        ],
    ),
    capability(
        "ecg_services",
        "ECG Services",
        "diagnostic",
        Complexity::Low,
        &[
            "ecg",
            "ekg",
            "electrocardiogram",
            "electrocardiography",
            "ecg services",
        ],
    ),
    capability(
        "eye_examination",
        "Eye Examination",
        "diagnostic",
        Complexity::Low,
        &[
            "eye examination",
            "eye exam",
            "eye care",
            "vision test",
            "refraction",
            "ophthalmology consultation",
            "eye check",
            "eye care services",
        ],
    ),
    capability(
        "emergency_services",
        "Emergency Services",
        "emergency",
        Complexity::High,
        &[
            "emergency services",
            "emergency care",
            "emergency department",
            "emergency room",
            "24-hour emergency",
            "24/7 emergency",
            "24hr emergency",
            "accident and emergency",
            "a&e",
            "casualty",
            "trauma care",
        ],
    ),
    capability(
        "icu_services",
        "ICU Services",
        "emergency",
        Complexity::High,
        &[
            "icu",
            "intensive care",
            "intensive care unit",
            "critical care",
            "high dependency unit",
            "hdu",
        ],
    ),
    capability(
        "nicu_services",
        "NICU Services",
        "emergency",
        Complexity::High,
        &[
            "nicu",
            "neonatal icu",
            "neonatal intensive care",
            "newborn intensive care",
            "special care baby unit",
            "scbu",
        ],
    ),
    capability(
        "maternity_services",
        "Maternity Services",
        "maternity",
        Complexity::Medium,
        &[
            "maternity",
            "maternity services",
            "antenatal care",
            "anc",
            "postnatal care",
            "obstetric care",
            "delivery services",
            "labour ward",
            "labor ward",
            "birthing",
        ],
    ),
    capability(
        "family_planning",
        "Family Planning",
        "maternity",
        Complexity::Low,
        &[
            "family planning",
            "contraception",
            "reproductive health",
            "birth control",
            "pmtct",
        ],
    ),
    capability(
        "dialysis",
        "Dialysis Services",
        "therapeutic",
        Complexity::High,
        &[
            "dialysis",
            "hemodialysis",
            "haemodialysis",
            "renal dialysis",
            "dialysis center",
            "dialysis unit",
        ],
    ),
    capability(
        "chemotherapy",
        "Chemotherapy",
        "therapeutic",
        Complexity::High,
        &[
            "chemotherapy",
            "chemo",
            "cancer treatment",
            "oncology treatment",
            "cancer therapy",
        ],
    ),
    capability(
        "radiotherapy",
        "Radiotherapy",
        "therapeutic",
        Complexity::High,
        &[
            "radiotherapy",
            "radiation therapy",
            "radiation treatment",
            "cobalt therapy",
        ],
    ),
    capability(
        "physiotherapy",
        "Physiotherapy",
        "therapeutic",
        Complexity::Low,
        &[
            "physiotherapy",
            "physical therapy",
            "rehabilitation",
            "physio",
            "rehab",
            "occupational therapy",
        ],
    ),
    capability(
        "hiv_treatment",
        "HIV/AIDS Treatment",
        "therapeutic",
        Complexity::Medium,
        &[
            "hiv",
            "aids",
            "hiv treatment",
            "hiv/aids",
            "antiretroviral",
            "art",
            "hiv testing",
            "hiv counseling",
            "hct",
        ],
    ),
    capability(
        "mental_health",
        "Mental Health Services",
        "therapeutic",
        Complexity::Medium,
        &[
            "mental health",
            "psychiatric",
            "psychiatry",
            "psychology",
            "counseling",
            "counselling",
            "behavioral health",
        ],
    ),
    capability(
        "vaccination",
        "Vaccination / Immunization",
        "general",
        Complexity::Low,
        &[
            "vaccination",
            "immunization",
            "immunisation",
            "vaccine",
            "travel immunisation",
            "travel vaccination",
        ],
    ),
    capability(
        "outpatient_services",
        "Outpatient Services (OPD)",
        "general",
        Complexity::Low,
        &[
            "outpatient",
            "opd",
            "outpatient department",
            "outpatient services",
            "general consultation",
            "medical consultation",
            "general opd",
            "specialist consultation",
        ],
    ),
    capability(
        "inpatient_services",
        "Inpatient Services",
        "general",
        Complexity::Medium,
        &[
            "inpatient",
            "in-patient",
            "admission",
            "ward",
            "inpatient care",
            "inpatient services",
            "hospitalization",
        ],
    ),
    capability(
        "pediatric_care",
        "Pediatric Care",
        "general",
        Complexity::Medium,
        &[
            "pediatric",
            "paediatric",
            "pediatrics",
            "children's health",
            "child health",
            "pediatric care",
            "child care",
        ],
    ),
    capability(
        "pharmacy_services",
        "Pharmacy Services",
        "general",
        Complexity::Low,
        &[
            "pharmacy",
            "dispensary",
            "pharmacy services",
            "medications",
            "drug dispensary",
        ],
    ),
];

/// Entries for a domain
pub fn entries(domain: Domain) -> &'static [VocabEntry] {
    match domain {
        Domain::Equipment => EQUIPMENT,
        Domain::Capability => CAPABILITIES,
    }
}

/// Look up one entry by canonical key
pub fn entry(domain: Domain, key: &str) -> Option<&'static VocabEntry> {
    entries(domain).iter().find(|e| e.key == key)
}

/// Canonical keys for a domain, sorted
pub fn keys(domain: Domain) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = entries(domain).iter().map(|e| e.key).collect();
    keys.sort_unstable();
    keys
}

/// Version hash of both vocabularies, keys only
///
/// Cached classification results are keyed by this value, so adding or
/// removing a canonical key invalidates the cache while alias edits do not.
pub fn vocab_version() -> String {
    let mut hasher = Sha256::new();
    for key in keys(Domain::Equipment) {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(b"--\n");
    for key in keys(Domain::Capability) {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    let mut hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex.truncate(8);
    hex
}
