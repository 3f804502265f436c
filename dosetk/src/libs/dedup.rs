use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use color_eyre::Result;
use indexmap::IndexMap;

use crate::io::{get_appender, read_lines, read_snp_list};
use crate::structs::{DedupJob, SnpRequest};
use crate::utils::alleles_match;

/// Rows kept by the duplicate resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupSummary {
    pub dose_rows: usize,
    pub info_rows: usize,
}

/// Keep only the rows whose alleles match the requested alleles, once per SNP and allele pair.
///
/// Dose rows are VCF records (CHROM, POS, ID, REF, ALT, ...) and info rows start with
/// SNP, REF(0), ALT(1). Kept rows are appended to the job outputs, which already hold the headers.
pub fn resolve_duplicates(job: &DedupJob) -> Result<DedupSummary> {
    let requests: Vec<SnpRequest> = read_snp_list(&job.snp_file)?
        .into_iter()
        .filter(|r| r.contig == job.prefix)
        .collect();

    let mut by_id: IndexMap<&str, Vec<&SnpRequest>> = IndexMap::new();
    let mut by_pos: IndexMap<u64, Vec<&SnpRequest>> = IndexMap::new();
    for request in &requests {
        by_id.entry(request.id.as_str()).or_default().push(request);
        by_pos.entry(request.pos).or_default().push(request);
    }

    let dose_rows = filter_rows(&job.vcf_dose, &job.output_dose, |fields| {
        let pos = fields.get(1)?.parse::<u64>().ok()?;
        let (reference, alt) = (fields.get(3)?, fields.get(4)?);
        let wanted = by_pos
            .get(&pos)?
            .iter()
            .any(|r| alleles_match(reference, alt, &r.effect_allele, &r.other_allele));

        wanted.then(|| format!("{}:{pos}:{reference}:{alt}", fields[0]))
    })?;

    let info_rows = filter_rows(&job.vcf_info, &job.output_info, |fields| {
        let id = *fields.first()?;
        let (reference, alt) = (fields.get(1)?, fields.get(2)?);
        let wanted = by_id
            .get(id)?
            .iter()
            .any(|r| alleles_match(reference, alt, &r.effect_allele, &r.other_allele));

        wanted.then(|| format!("{id}:{reference}:{alt}"))
    })?;

    tracing::debug!(
        "chr{}: kept {dose_rows} dose rows and {info_rows} info rows",
        job.prefix
    );

    Ok(DedupSummary {
        dose_rows,
        info_rows,
    })
}

// `key` returns None for rows to drop and a dedup key for rows to keep
fn filter_rows<F>(input: &Path, output: &Path, key: F) -> Result<usize>
where
    F: Fn(&[&str]) -> Option<String>,
{
    let mut seen = HashSet::new();
    let mut wrtr = get_appender(output)?;
    let mut kept = 0;

    for line in read_lines(input)? {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if let Some(key) = key(&fields) {
            if seen.insert(key) {
                writeln!(wrtr, "{line}")?;
                kept += 1;
            }
        }
    }

    wrtr.flush()?;
    Ok(kept)
}
