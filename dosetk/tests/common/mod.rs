#![allow(dead_code)]
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use color_eyre::Result;

use dosetk::{
    dedup::resolve_duplicates,
    error::DoseError,
    io::{append_ext, get_output, read_lines},
    structs::DedupJob,
    tools::Toolbox,
};

pub const IMPUTED: &str = "tests/data/imputed";
pub const MISMATCHED: &str = "tests/data/mismatched";
pub const NO_DOSE: &str = "tests/data/no_dose";
pub const SNPS: &str = "tests/data/snps.txt";
pub const SNPS_ALL: &str = "tests/data/snps_all.txt";
pub const OUTDIR: &str = "tests/results";

/// Stands in for vcf-concat, tabix and vcftools so the pipelines run without them
#[derive(Debug, Default)]
pub struct FakeTools {
    pub fail_contig: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl FakeTools {
    pub fn failing_on(contig: &'static str) -> Self {
        Self {
            fail_contig: Some(contig),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Toolbox for FakeTools {
    fn concat_vcfs(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        self.record_call();
        let mut wrtr = get_output(Some(output.to_path_buf()))?;

        for (i, input) in inputs.iter().enumerate() {
            for line in read_lines(input)? {
                let line = line?;
                if i == 0 || !line.starts_with('#') {
                    writeln!(wrtr, "{line}")?;
                }
            }
        }
        wrtr.flush()?;
        Ok(())
    }

    fn tabix_region(&self, file: &Path, contig: &str, pos: u64) -> Result<Vec<u8>> {
        self.record_call();
        if self.fail_contig == Some(contig) {
            return Err(DoseError::ToolFailed((
                "tabix".to_string(),
                Some(1),
                format!("could not load index for {file:?}"),
            ))
            .into());
        }

        let pos = pos.to_string();
        let mut hits = vec![];
        for line in read_lines(file)? {
            let line = line?;
            let mut fields = line.split('\t');
            if fields.next() == Some(contig) && fields.next() == Some(pos.as_str()) {
                hits.extend_from_slice(line.as_bytes());
                hits.push(b'\n');
            }
        }
        Ok(hits)
    }

    fn extract_format_field(&self, vcf: &Path, field: &str, prefix: &Path) -> Result<PathBuf> {
        self.record_call();
        let out = append_ext(format!("{field}.FORMAT"), &prefix.to_path_buf());
        let mut wrtr = get_output(Some(out.clone()))?;

        for line in read_lines(vcf)? {
            let line = line?;
            if line.starts_with("##") {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if line.starts_with("#CHROM") {
                writeln!(wrtr, "CHROM\tPOS\t{}", fields[9..].join("\t"))?;
                continue;
            }

            let idx = fields[8].split(':').position(|f| f == field).unwrap();
            let values: Vec<&str> = fields[9..]
                .iter()
                .map(|s| s.split(':').nth(idx).unwrap())
                .collect();
            writeln!(wrtr, "{}\t{}\t{}", fields[0], fields[1], values.join("\t"))?;
        }
        wrtr.flush()?;
        Ok(out)
    }

    fn remove_duplicates(&self, job: &DedupJob) -> Result<()> {
        self.record_call();
        resolve_duplicates(job)?;
        Ok(())
    }
}

/// Fresh output directory for a single test
pub fn outdir(name: &str) -> PathBuf {
    let path = PathBuf::from(OUTDIR).join(name);
    let _ = std::fs::remove_dir_all(&path);
    std::fs::create_dir_all(&path).unwrap();
    path
}

pub fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

pub fn data_lines(path: &Path) -> Vec<String> {
    lines(path)
        .into_iter()
        .filter(|l| !l.starts_with('#'))
        .collect()
}
