use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use color_eyre::{eyre::eyre, Result};
use itertools::Itertools;

use crate::args::CombineArgs;
use crate::error::DoseError::{MismatchedRows, NoMatchingFiles};
use crate::io::{count_lines, ensure_dir, get_input, get_output};
use crate::structs::CombinedFiles;
use crate::tools::Toolbox;

/// Tabix and CSI indexes sit next to the dose files
const INDEX_EXTENSIONS: [&str; 2] = [".tbi", ".csi"];

/// Dose and info files of a folder, in natural order so that the two lists line up by chromosome
pub fn get_files(folder: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    tracing::info!("Combining files in {}", folder.display());

    let names = std::fs::read_dir(folder)
        .map_err(|e| eyre!("Error reading directory {folder:?}: {e}"))?
        .map(|entry| Ok(entry?.file_name().to_string_lossy().to_string()))
        .collect::<Result<Vec<String>>>()?
        .into_iter()
        .sorted_by(|a, b| alphanumeric_sort::compare_str(a, b))
        .collect::<Vec<String>>();

    let pick = |kind: &'static str| -> Result<Vec<PathBuf>> {
        let files: Vec<PathBuf> = names
            .iter()
            .filter(|name| name.contains(kind))
            .filter(|name| !INDEX_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
            .map(|name| folder.join(name))
            .collect();

        match files.is_empty() {
            true => Err(NoMatchingFiles((folder.to_path_buf(), kind)).into()),
            false => Ok(files),
        }
    };

    Ok((pick("dose")?, pick("info")?))
}

/// Concatenate info files keeping only the header of the first one
pub fn concat_info(infos: &[PathBuf], output: &Path) -> Result<()> {
    tracing::info!("Combining the info files");

    let mut wrtr = get_output(Some(output.to_path_buf()))?;

    for (i, path) in infos.iter().enumerate() {
        let reader = BufReader::new(get_input(Some(path.clone()))?);

        for line in reader.lines().skip(usize::from(i > 0)) {
            writeln!(wrtr, "{}", line?)?;
        }
    }

    wrtr.flush()?;
    Ok(())
}

/// Number of SNPs in the combined files, the info header and dose comment lines excluded
pub fn check_row_counts(dose: &Path, info: &Path) -> Result<usize> {
    tracing::info!("Quality check");

    let info_rows = count_lines(info, |_| false)?.saturating_sub(1);
    let dose_rows = count_lines(dose, |line| line.starts_with('#'))?;

    tracing::info!("SNPs found (dose): {dose_rows}");
    tracing::info!("SNPs found (info): {info_rows}");

    match dose_rows == info_rows {
        true => Ok(dose_rows),
        false => Err(MismatchedRows((dose_rows, info_rows)).into()),
    }
}

#[tracing::instrument(skip(tools))]
pub fn run(tools: &impl Toolbox, args: &CombineArgs) -> Result<CombinedFiles> {
    let (vcfs, infos) = get_files(&args.folder)?;
    ensure_dir(&args.output)?;

    let dose = args.dose_path();
    let info = args.info_path();

    // Dose is the bottleneck (bigger file)
    std::thread::scope(|s| -> Result<()> {
        let dose_handle = s.spawn(|| {
            tracing::info!("Combining the dose files");
            tools.concat_vcfs(&vcfs, &dose)
        });

        let info_result = concat_info(&infos, &info);

        dose_handle
            .join()
            .map_err(|_| eyre!("Dose concatenation thread panicked"))??;
        info_result
    })?;

    let snps = check_row_counts(&dose, &info)?;

    Ok(CombinedFiles { dose, info, snps })
}
