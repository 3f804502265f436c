use std::path::PathBuf;

/// Locations of the external programs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ToolArgs {
    /// vcf-concat executable used to combine dose files
    #[cfg_attr(feature = "clap", arg(long, default_value_os_t = PathBuf::from("vcf-concat")))]
    pub vcf_concat: PathBuf,

    /// tabix executable used for indexed position lookups
    #[cfg_attr(feature = "clap", arg(long, default_value_os_t = PathBuf::from("tabix")))]
    pub tabix: PathBuf,

    /// vcftools executable used to extract the DS field
    #[cfg_attr(feature = "clap", arg(long, default_value_os_t = PathBuf::from("vcftools")))]
    pub vcftools: PathBuf,

    /// Rscript executable for running --dedup-script
    #[cfg_attr(feature = "clap", arg(long, default_value_os_t = PathBuf::from("Rscript")))]
    pub rscript: PathBuf,

    /// External R script resolving duplicate SNPs (built-in resolver is used if not given)
    #[cfg_attr(feature = "clap", arg(long, value_hint = clap::ValueHint::FilePath))]
    pub dedup_script: Option<PathBuf>,
}

impl Default for ToolArgs {
    fn default() -> Self {
        Self {
            vcf_concat: PathBuf::from("vcf-concat"),
            tabix: PathBuf::from("tabix"),
            vcftools: PathBuf::from("vcftools"),
            rscript: PathBuf::from("Rscript"),
            dedup_script: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct CombineArgs {
    /// Folder location of the per-chromosome dose and info files
    #[cfg_attr(feature = "clap", arg(long, value_hint = clap::ValueHint::DirPath))]
    pub folder: PathBuf,

    /// Output directory for the combined files
    #[cfg_attr(feature = "clap", arg(short = 'o', long="outdir", default_value_os_t = PathBuf::from("./"), value_hint = clap::ValueHint::DirPath))]
    pub output: PathBuf,

    /// Output filename prefix
    #[cfg_attr(feature = "clap", arg(short = 'p', long, default_value_t = String::from("combined")))]
    pub prefix: String,
}

impl Default for CombineArgs {
    fn default() -> Self {
        Self {
            folder: PathBuf::new(),
            output: PathBuf::from("./"),
            prefix: String::from("combined"),
        }
    }
}

impl CombineArgs {
    pub fn dose_path(&self) -> PathBuf {
        self.output.join(format!("{}.dose.txt", self.prefix))
    }

    pub fn info_path(&self) -> PathBuf {
        self.output.join(format!("{}.info.txt", self.prefix))
    }

    pub fn prefix_path(&self) -> PathBuf {
        self.output.join(&self.prefix)
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    #[test]
    fn test_combine_paths() {
        let args = CombineArgs { output: PathBuf::from("work"), ..Default::default() };
        assert_eq!(args.dose_path(), PathBuf::from("work/combined.dose.txt"));
        assert_eq!(args.info_path(), PathBuf::from("work/combined.info.txt"));
        assert_eq!(args.prefix_path(), PathBuf::from("work/combined"));
    }
}
