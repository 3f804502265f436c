/// Combine per-chromosome dose and info files
pub mod combine;

/// Extract SNPs by position from per-chromosome files
pub mod extract;

/// Combined dose files to an annotated dosage table
pub mod make_dose;
