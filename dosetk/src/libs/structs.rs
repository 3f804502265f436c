use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::io::append_ext;

/// A single row of the SNP list: id, effect allele, non-effect allele and any extra columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnpRequest {
    pub id: String,
    pub contig: String,
    pub pos: u64,
    pub effect_allele: String,
    pub other_allele: String,
    pub extra: Vec<String>,
}

impl SnpRequest {
    pub fn on_chromosome(&self, chromosome: &str) -> bool {
        self.id
            .strip_prefix(chromosome)
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl std::fmt::Display for SnpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.id, self.effect_allele, self.other_allele
        )
    }
}

/// Input and output locations for the extraction of one chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeFiles {
    pub in_dose: PathBuf,
    pub in_info: PathBuf,
    pub out_dose: PathBuf,
    pub out_info: PathBuf,
}

impl ChromosomeFiles {
    pub fn new(chromosome: &str, vcf_dir: &Path, out_dir: &Path) -> Self {
        Self {
            in_dose: vcf_dir.join(format!("chr{chromosome}.dose.vcf.gz")),
            in_info: vcf_dir.join(format!("chr{chromosome}.info.gz")),
            out_dose: out_dir.join(format!("chr{chromosome}.dose.vcf.filter")),
            out_info: out_dir.join(format!("chr{chromosome}.info.filter")),
        }
    }

    pub fn tmp_dose(&self) -> PathBuf {
        append_ext("tmp", &self.out_dose)
    }

    pub fn tmp_info(&self) -> PathBuf {
        append_ext("tmp", &self.out_info)
    }
}

/// Everything the duplicate resolver needs for one chromosome
#[derive(Debug, Clone, PartialEq)]
pub struct DedupJob {
    pub prefix: String,
    pub vcf_dose: PathBuf,
    pub vcf_info: PathBuf,
    pub snp_file: PathBuf,
    pub output_dose: PathBuf,
    pub output_info: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedFiles {
    pub dose: PathBuf,
    pub info: PathBuf,
    pub snps: usize,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStatus {
    Extracted,
    NoSnps,
    NoMatches,
    Failed,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeReport {
    pub chromosome: String,
    pub requested: usize,
    pub dose_rows: usize,
    pub info_rows: usize,
    pub status: ExtractStatus,
}

impl ChromosomeReport {
    pub fn new(chromosome: &str, requested: usize, status: ExtractStatus) -> Self {
        Self {
            chromosome: chromosome.to_string(),
            requested,
            dose_rows: 0,
            info_rows: 0,
            status,
        }
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    fn request(id: &str) -> SnpRequest {
        SnpRequest {
            id: id.to_string(),
            contig: id.split(':').next().unwrap().to_string(),
            pos: 1,
            effect_allele: "A".to_string(),
            other_allele: "G".to_string(),
            extra: vec![],
        }
    }

    #[test]
    fn test_on_chromosome() {
        assert!(request("1:100").on_chromosome("1"));
        assert!(!request("11:100").on_chromosome("1"));
        assert!(!request("1:100").on_chromosome("11"));
    }

    #[test]
    fn test_chromosome_files() {
        let files = ChromosomeFiles::new("7", Path::new("in"), Path::new("out"));
        assert_eq!(files.in_dose, PathBuf::from("in/chr7.dose.vcf.gz"));
        assert_eq!(files.in_info, PathBuf::from("in/chr7.info.gz"));
        assert_eq!(files.tmp_dose(), PathBuf::from("out/chr7.dose.vcf.filter.tmp"));
        assert_eq!(files.tmp_info(), PathBuf::from("out/chr7.info.filter.tmp"));
    }
}
