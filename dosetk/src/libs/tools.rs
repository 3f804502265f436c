use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

use crate::args::ToolArgs;
use crate::dedup::resolve_duplicates;
use crate::error::DoseError::ToolFailed;
use crate::io::append_ext;
use crate::structs::DedupJob;

/// The external programs the pipelines delegate variant file work to
pub trait Toolbox: Send + Sync {
    /// Concatenate VCF files into `output`, reconciling their headers
    fn concat_vcfs(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;

    /// Fetch the records at a single base pair of an indexed VCF
    fn tabix_region(&self, file: &Path, contig: &str, pos: u64) -> Result<Vec<u8>>;

    /// Write a per-sample matrix of a FORMAT field and return its path
    fn extract_format_field(&self, vcf: &Path, field: &str, prefix: &Path) -> Result<PathBuf>;

    /// Reconcile multiple alleles at a position against the requested alleles
    fn remove_duplicates(&self, job: &DedupJob) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct ExternalTools {
    pub vcf_concat: PathBuf,
    pub tabix: PathBuf,
    pub vcftools: PathBuf,
    pub rscript: PathBuf,
    pub dedup_script: Option<PathBuf>,
}

impl Default for ExternalTools {
    fn default() -> Self {
        Self::from(ToolArgs::default())
    }
}

impl From<ToolArgs> for ExternalTools {
    fn from(args: ToolArgs) -> Self {
        Self {
            vcf_concat: args.vcf_concat,
            tabix: args.tabix,
            vcftools: args.vcftools,
            rscript: args.rscript,
            dedup_script: args.dedup_script,
        }
    }
}

impl ExternalTools {
    pub fn concat_command(&self, inputs: &[PathBuf]) -> Command {
        let mut cmd = Command::new(&self.vcf_concat);
        cmd.args(inputs);
        cmd
    }

    pub fn tabix_command(&self, file: &Path, contig: &str, pos: u64) -> Command {
        let mut cmd = Command::new(&self.tabix);
        cmd.arg(file).arg(format!("{contig}:{pos}-{pos}"));
        cmd
    }

    pub fn format_field_command(&self, vcf: &Path, field: &str, prefix: &Path) -> Command {
        let mut cmd = Command::new(&self.vcftools);
        cmd.arg("--vcf")
            .arg(vcf)
            .args(["--extract-FORMAT-info", field])
            .arg("--out")
            .arg(prefix);
        cmd
    }

    /// `None` when duplicates are resolved in-process
    pub fn dedup_command(&self, job: &DedupJob) -> Option<Command> {
        let script = self.dedup_script.as_ref()?;

        let mut cmd = Command::new(&self.rscript);
        cmd.arg(script)
            .args(["--prefix", &job.prefix])
            .arg("--vcf_dose")
            .arg(&job.vcf_dose)
            .arg("--vcf_info")
            .arg(&job.vcf_info)
            .arg("--snp_file_name")
            .arg(&job.snp_file)
            .arg("--output_dose")
            .arg(&job.output_dose)
            .arg("--output_info")
            .arg(&job.output_info);
        Some(cmd)
    }
}

impl Toolbox for ExternalTools {
    fn concat_vcfs(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let file = File::create(output).wrap_err(eyre!("failed to create {output:?}"))?;

        let mut cmd = self.concat_command(inputs);
        cmd.stdout(Stdio::from(file));

        run_checked(&mut cmd)?;
        Ok(())
    }

    fn tabix_region(&self, file: &Path, contig: &str, pos: u64) -> Result<Vec<u8>> {
        Ok(run_checked(&mut self.tabix_command(file, contig, pos))?.stdout)
    }

    fn extract_format_field(&self, vcf: &Path, field: &str, prefix: &Path) -> Result<PathBuf> {
        run_checked(&mut self.format_field_command(vcf, field, prefix))?;

        Ok(append_ext(format!("{field}.FORMAT"), &prefix.to_path_buf()))
    }

    fn remove_duplicates(&self, job: &DedupJob) -> Result<()> {
        match self.dedup_command(job) {
            Some(mut cmd) => {
                run_checked(&mut cmd)?;
            }
            None => {
                let summary = resolve_duplicates(job)?;
                tracing::debug!(
                    "chr{}: kept {} dose and {} info rows",
                    job.prefix,
                    summary.dose_rows,
                    summary.info_rows
                );
            }
        }
        Ok(())
    }
}

/// Run a command to completion and turn a non-zero exit into an error
pub fn run_checked(cmd: &mut Command) -> Result<Output> {
    let tool = program_name(cmd.get_program());
    tracing::debug!("Running {cmd:?}");

    let output = cmd
        .stderr(Stdio::piped())
        .output()
        .wrap_err(eyre!("Failed to launch {tool}. Is it installed and in PATH?"))?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(ToolFailed((tool, output.status.code(), stderr)).into());
    }

    if !stderr.is_empty() {
        tracing::warn!("{tool}: {stderr}");
    }

    Ok(output)
}

fn program_name(program: &OsStr) -> String {
    Path::new(program)
        .file_name()
        .unwrap_or(program)
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    #[test]
    fn test_program_name() {
        assert_eq!(program_name(OsStr::new("/usr/bin/tabix")), "tabix");
        assert_eq!(program_name(OsStr::new("vcf-concat")), "vcf-concat");
    }

    #[test]
    fn test_missing_tool() {
        let mut cmd = Command::new("dosetk-tool-that-does-not-exist");
        let err = run_checked(&mut cmd).unwrap_err();
        assert!(err.to_string().contains("Failed to launch dosetk-tool-that-does-not-exist"));
    }

    #[test]
    #[cfg(unix)]
    fn test_non_zero_exit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo broken >&2; exit 3"]);
        let err = run_checked(&mut cmd).unwrap_err();
        assert_eq!(err.to_string(), "sh exited with status 3: broken");
    }

    #[test]
    #[cfg(unix)]
    fn test_stdout_is_captured() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf '1\t100\n'"]);
        let output = run_checked(&mut cmd).unwrap();
        assert_eq!(output.stdout, b"1\t100\n");
    }

    fn argv(cmd: &Command) -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect()
    }

    fn job() -> DedupJob {
        DedupJob {
            prefix: String::from("2"),
            vcf_dose: PathBuf::from("out/chr2.dose.vcf.filter.tmp"),
            vcf_info: PathBuf::from("out/chr2.info.filter.tmp"),
            snp_file: PathBuf::from("snps.txt"),
            output_dose: PathBuf::from("out/chr2.dose.vcf.filter"),
            output_info: PathBuf::from("out/chr2.info.filter"),
        }
    }

    #[test]
    fn test_command_lines() {
        let tools = ExternalTools::default();

        let cmd = tools.tabix_command(Path::new("chr1.dose.vcf.gz"), "1", 12345);
        assert_eq!(cmd.get_program(), "tabix");
        assert_eq!(argv(&cmd), ["chr1.dose.vcf.gz", "1:12345-12345"]);

        let cmd = tools.concat_command(&[PathBuf::from("chr1.dose.vcf.gz"), PathBuf::from("chr2.dose.vcf.gz")]);
        assert_eq!(cmd.get_program(), "vcf-concat");
        assert_eq!(argv(&cmd), ["chr1.dose.vcf.gz", "chr2.dose.vcf.gz"]);

        let cmd = tools.format_field_command(Path::new("combined.dose.txt"), "DS", Path::new("work/combined"));
        assert_eq!(cmd.get_program(), "vcftools");
        assert_eq!(argv(&cmd), ["--vcf", "combined.dose.txt", "--extract-FORMAT-info", "DS", "--out", "work/combined"]);
    }

    #[test]
    fn test_dedup_command() {
        assert!(ExternalTools::default().dedup_command(&job()).is_none());

        let tools = ExternalTools { dedup_script: Some(PathBuf::from("rm_duplicates.R")), ..Default::default() };
        let cmd = tools.dedup_command(&job()).unwrap();
        assert_eq!(cmd.get_program(), "Rscript");
        assert_eq!(argv(&cmd), [
            "rm_duplicates.R",
            "--prefix", "2",
            "--vcf_dose", "out/chr2.dose.vcf.filter.tmp",
            "--vcf_info", "out/chr2.info.filter.tmp",
            "--snp_file_name", "snps.txt",
            "--output_dose", "out/chr2.dose.vcf.filter",
            "--output_info", "out/chr2.info.filter",
        ]);
    }

    #[test]
    #[cfg(unix)]
    fn test_tabix_region_returns_stdout() {
        let tools = ExternalTools { tabix: PathBuf::from("echo"), ..Default::default() };
        let hits = tools.tabix_region(Path::new("x.vcf.gz"), "1", 5).unwrap();
        assert_eq!(hits, b"x.vcf.gz 1:5-5\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_concat_writes_stdout_to_output() {
        std::fs::create_dir_all("tests/results").unwrap();
        let output = PathBuf::from("tests/results/tools_concat.txt");

        let tools = ExternalTools { vcf_concat: PathBuf::from("echo"), ..Default::default() };
        tools.concat_vcfs(&[PathBuf::from("a.vcf.gz"), PathBuf::from("b.vcf.gz")], &output).unwrap();

        assert_eq!(std::fs::read_to_string(output).unwrap(), "a.vcf.gz b.vcf.gz\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_extract_format_field_path() {
        let tools = ExternalTools { vcftools: PathBuf::from("true"), ..Default::default() };
        let path = tools.extract_format_field(Path::new("combined.dose.txt"), "DS", Path::new("work/combined")).unwrap();
        assert_eq!(path, PathBuf::from("work/combined.DS.FORMAT"));
    }

    #[test]
    #[cfg(unix)]
    fn test_failing_dedup_script() {
        let tools = ExternalTools {
            rscript: PathBuf::from("false"),
            dedup_script: Some(PathBuf::from("rm_duplicates.R")),
            ..Default::default()
        };
        let err = tools.remove_duplicates(&job()).unwrap_err();
        assert!(matches!(err.downcast_ref::<crate::error::DoseError>(), Some(ToolFailed((tool, Some(1), _))) if tool == "false"));
    }

    #[test]
    fn test_format_field_path() {
        let prefix = PathBuf::from("work/combined");
        assert_eq!(append_ext("DS.FORMAT", &prefix), PathBuf::from("work/combined.DS.FORMAT"));
    }
}
