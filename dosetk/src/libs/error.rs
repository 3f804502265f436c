use std::path::PathBuf;

#[derive(Debug)]
pub enum DoseError {
    FileNotFound(PathBuf),
    SnpColumnCount((usize, usize)),
    EmptySnpList(PathBuf),
    SnpIdFormat(String),
    NoChromosomeFiles(PathBuf),
    NoMatchingFiles((PathBuf, &'static str)),
    MismatchedRows((usize, usize)),
    DosageRows((usize, usize)),
    ShapeMismatch(((usize, usize), (usize, usize))),
    ToolFailed((String, Option<i32>, String)),
    ChromosomesFailed(Vec<String>),
}

impl std::fmt::Display for DoseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "{} does not exist", path.display()),
            Self::SnpColumnCount((line, found)) => write!(
                f,
                "The SNP file's first three columns should contain id, effect allele, noneffect allele, etc. Line {line} has {found} columns. Please check again"
            ),
            Self::EmptySnpList(path) => {
                write!(f, "The SNP file {} contains no SNPs", path.display())
            }
            Self::SnpIdFormat(id) => write!(
                f,
                "Format of the id column is invalid, should have the format 'chr:pos'. Found {id:?}"
            ),
            Self::NoChromosomeFiles(dir) => write!(
                f,
                "Could not find any dose files in {}, all files should start with 'chr'",
                dir.display()
            ),
            Self::NoMatchingFiles((dir, kind)) => {
                write!(f, "No {kind} files found in {}", dir.display())
            }
            Self::MismatchedRows((dose, info)) => write!(
                f,
                "Mismatched dose and info files. SNPs found (dose): {dose}, SNPs found (info): {info}"
            ),
            Self::DosageRows((dose, matrix)) => write!(
                f,
                "Mismatched dose file and dosage matrix. SNPs found (dose): {dose}, rows found (dosage matrix): {matrix}"
            ),
            Self::ShapeMismatch((expected, found)) => write!(
                f,
                "Expected a table of shape {expected:?} after the join, found {found:?}. The join dropped or duplicated rows"
            ),
            Self::ToolFailed((tool, code, stderr)) => match code {
                Some(code) => write!(f, "{tool} exited with status {code}: {stderr}"),
                None => write!(f, "{tool} was terminated by a signal: {stderr}"),
            },
            Self::ChromosomesFailed(chromosomes) => write!(
                f,
                "SNP extraction failed for chromosomes: {}",
                chromosomes.join(", ")
            ),
        }
    }
}

impl std::error::Error for DoseError {}
