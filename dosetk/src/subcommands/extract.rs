use std::collections::HashSet;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use color_eyre::{eyre::eyre, Result};
use itertools::Itertools;
use rayon::prelude::*;

use crate::error::DoseError::{ChromosomesFailed, NoChromosomeFiles};
use crate::io::{
    check_existence, count_lines, ensure_dir, get_appender, get_input, get_output,
    get_report_writer, read_snp_list, remove_if_exists,
};
use crate::structs::{
    ChromosomeFiles, ChromosomeReport, DedupJob, ExtractStatus, SnpRequest,
};
use crate::tools::Toolbox;
use crate::utils::chromosome_from_filename;

// Dose headers are looked for only this far into the file
const HEADER_SEARCH_LINES: usize = 100;

pub const REPORT_NAME: &str = "extract_report.tsv";

/// Chromosomes that have a dose file in `vcf_dir`, i.e. chr22.dose.vcf.gz
pub fn discover_chromosomes(vcf_dir: &Path) -> Result<Vec<String>> {
    let chromosomes = std::fs::read_dir(vcf_dir)
        .map_err(|e| eyre!("Error reading directory {vcf_dir:?}: {e}"))?
        .map(|entry| Ok(entry?.file_name().to_string_lossy().to_string()))
        .collect::<Result<Vec<String>>>()?
        .iter()
        .filter(|name| name.contains("dose"))
        .filter_map(|name| chromosome_from_filename(name).map(String::from))
        .unique()
        .sorted_by(|a, b| alphanumeric_sort::compare_str(a, b))
        .collect::<Vec<String>>();

    tracing::info!("Found {} files to extract SNPs from", chromosomes.len());

    match chromosomes.is_empty() {
        true => Err(NoChromosomeFiles(vcf_dir.to_path_buf()).into()),
        false => Ok(chromosomes),
    }
}

/// Copy the `#` lines near the top of the dose file and the first line of the info file
pub fn write_headers(files: &ChromosomeFiles) -> Result<()> {
    let dose = BufReader::new(get_input(Some(files.in_dose.clone()))?);
    let mut wrtr = get_output(Some(files.out_dose.clone()))?;
    for line in dose.lines().take(HEADER_SEARCH_LINES) {
        let line = line?;
        if line.starts_with('#') {
            writeln!(wrtr, "{line}")?;
        }
    }
    wrtr.flush()?;

    let info = BufReader::new(get_input(Some(files.in_info.clone()))?);
    let mut wrtr = get_output(Some(files.out_info.clone()))?;
    if let Some(line) = info.lines().next() {
        writeln!(wrtr, "{}", line?)?;
    }
    wrtr.flush()?;

    Ok(())
}

/// Single pass over the info file keeping the rows of the requested SNPs
pub fn filter_info(input: &Path, output: &Path, requests: &[&SnpRequest]) -> Result<usize> {
    let ids: HashSet<&str> = requests.iter().map(|r| r.id.as_str()).collect();

    let reader = BufReader::new(get_input(Some(input.to_path_buf()))?);
    let mut wrtr = get_output(Some(output.to_path_buf()))?;
    let mut kept = 0;

    for line in reader.lines() {
        let line = line?;
        let first = line.split_whitespace().next().unwrap_or_default();
        if ids.contains(first) {
            writeln!(wrtr, "{line}")?;
            kept += 1;
        }
    }

    wrtr.flush()?;
    Ok(kept)
}

/// One indexed lookup per requested position, appended to `output` in request order
pub fn query_dose(
    tools: &impl Toolbox,
    input: &Path,
    output: &Path,
    chromosome: &str,
    requests: &[&SnpRequest],
) -> Result<usize> {
    let positions: Vec<u64> = requests.iter().map(|r| r.pos).unique().collect();

    let hits = positions
        .par_iter()
        .map(|pos| tools.tabix_region(input, chromosome, *pos))
        .collect::<Result<Vec<Vec<u8>>>>()?;

    let mut wrtr = get_appender(output)?;
    let mut rows = 0;
    for hit in hits {
        rows += hit.iter().filter(|b| **b == b'\n').count();
        wrtr.write_all(&hit)?;
    }
    wrtr.flush()?;

    Ok(rows)
}

/// Extract the requested SNPs of one chromosome. Writes nothing if none of the SNPs are on it.
#[tracing::instrument(skip(tools, requests, files))]
pub fn process_chromosome(
    tools: &impl Toolbox,
    chromosome: &str,
    snp_list: &Path,
    requests: &[SnpRequest],
    files: &ChromosomeFiles,
) -> Result<ChromosomeReport> {
    check_existence(snp_list)?;
    check_existence(&files.in_info)?;
    check_existence(&files.in_dose)?;

    let wanted: Vec<&SnpRequest> = requests
        .iter()
        .filter(|r| r.on_chromosome(chromosome))
        .collect();

    if wanted.is_empty() {
        tracing::debug!("No requested SNPs on chr{chromosome}");
        return Ok(ChromosomeReport::new(chromosome, 0, ExtractStatus::NoSnps));
    }

    tracing::info!("Extracting {} SNPs from chr{chromosome}", wanted.len());

    write_headers(files)?;

    let (tmp_dose, tmp_info) = (files.tmp_dose(), files.tmp_info());
    remove_if_exists(&tmp_dose)?;

    let (info_rows, dose_rows) = rayon::join(
        || filter_info(&files.in_info, &tmp_info, &wanted),
        || query_dose(tools, &files.in_dose, &tmp_dose, chromosome, &wanted),
    );
    let (info_rows, dose_rows) = (info_rows?, dose_rows?);

    tracing::debug!("chr{chromosome}: {dose_rows} dose and {info_rows} info candidates");

    let mut report = ChromosomeReport::new(chromosome, wanted.len(), ExtractStatus::NoMatches);

    if info_rows > 0 {
        tools.remove_duplicates(&DedupJob {
            prefix: chromosome.to_string(),
            vcf_dose: tmp_dose.clone(),
            vcf_info: tmp_info.clone(),
            snp_file: snp_list.to_path_buf(),
            output_dose: files.out_dose.clone(),
            output_info: files.out_info.clone(),
        })?;

        report.dose_rows = count_lines(&files.out_dose, |l| l.starts_with('#'))?;
        report.info_rows = count_lines(&files.out_info, |_| false)?.saturating_sub(1);
        report.status = ExtractStatus::Extracted;
    } else {
        tracing::warn!("None of the requested SNPs were found in {:?}", files.in_info);
    }

    remove_if_exists(&tmp_dose)?;
    remove_if_exists(&tmp_info)?;

    Ok(report)
}

pub fn write_report(path: PathBuf, reports: &[ChromosomeReport]) -> Result<()> {
    let mut wrtr = get_report_writer(get_output(Some(path))?);
    for report in reports {
        wrtr.serialize(report)?;
    }
    wrtr.flush()?;
    Ok(())
}

/// Extract SNPs from every chromosome in parallel. A failing chromosome does not stop the others,
/// the failures are reported together once all chromosomes are done.
#[tracing::instrument(skip(tools))]
pub fn run(
    tools: &impl Toolbox,
    snp_list: &Path,
    vcf_dir: &Path,
    out_dir: &Path,
    threads: Option<usize>,
) -> Result<Vec<ChromosomeReport>> {
    ensure_dir(out_dir)?;

    let chromosomes = discover_chromosomes(vcf_dir)?;
    let requests = read_snp_list(snp_list)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or(chromosomes.len()))
        .build()?;

    tracing::info!("Initiating");
    let results: Vec<(String, Result<ChromosomeReport>)> = pool.install(|| {
        chromosomes
            .par_iter()
            .map(|c| {
                let files = ChromosomeFiles::new(c, vcf_dir, out_dir);
                let result = process_chromosome(tools, c, snp_list, &requests, &files);
                (c.clone(), result)
            })
            .collect()
    });

    let mut reports = vec![];
    let mut failed = vec![];
    for (chromosome, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!("SNP extraction failed for chr{chromosome}: {e:?}");
                reports.push(ChromosomeReport::new(&chromosome, 0, ExtractStatus::Failed));
                failed.push(chromosome);
            }
        }
    }

    write_report(out_dir.join(REPORT_NAME), &reports)?;

    match failed.is_empty() {
        true => Ok(reports),
        false => Err(ChromosomesFailed(failed).into()),
    }
}
