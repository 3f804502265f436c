use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use color_eyre::{
    eyre::{ensure, eyre, WrapErr},
    Result,
};

use crate::args::CombineArgs;
use crate::error::DoseError::{DosageRows, ShapeMismatch};
use crate::io::{count_lines, get_input, get_tsv_reader, open_strict_tsv_writer};
use crate::subcommands::combine;
use crate::tools::Toolbox;

pub const KEY_COLUMNS: [&str; 3] = ["SNP", "REF0", "ALT1"];

/// SNP id with its reference and alternate allele
pub type SnpKey = (String, String, String);

/// Per-sample dosage matrix with the CHROM and POS columns first
#[derive(Debug, Clone, PartialEq)]
pub struct DosageMatrix {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DosageMatrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.header.len())
    }
}

/// Final dosage table: the key columns followed by the dosage matrix columns
#[derive(Debug, Clone, PartialEq)]
pub struct DosageTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DosageTable {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.header.len())
    }
}

/// SNP, REF(0) and ALT(1) columns of the combined info table
pub fn read_info_alleles(path: &Path) -> Result<Vec<SnpKey>> {
    let mut rdr = get_tsv_reader(get_input(Some(path.to_path_buf()))?, true);

    rdr.records()
        .enumerate()
        .map(|(i, record)| {
            let record = record?;
            match (record.get(0), record.get(1), record.get(2)) {
                (Some(snp), Some(reference), Some(alt)) => {
                    Ok((snp.to_string(), reference.to_string(), alt.to_string()))
                }
                _ => Err(eyre!("Info row {} has less than 3 columns", i + 2)),
            }
        })
        .collect()
}

/// Comment lines to skip so that the `#CHROM` header is the first line read
pub fn meta_line_count(dose: &Path) -> Result<usize> {
    Ok(count_lines(dose, |line| !line.starts_with('#'))?.saturating_sub(1))
}

/// REF and ALT of every record in the combined dose file, in file order
pub fn read_dose_alleles(dose: &Path) -> Result<Vec<(String, String)>> {
    let skip = meta_line_count(dose)?;
    let reader = BufReader::new(get_input(Some(dose.to_path_buf()))?);

    let mut lines = reader.lines().skip(skip);
    let header = lines
        .next()
        .ok_or_else(|| eyre!("{dose:?} has no #CHROM header"))??;
    ensure!(
        header.starts_with("#CHROM"),
        "Expected the #CHROM header in {dose:?}, found {header:?}"
    );

    let mut alleles = vec![];
    for line in lines {
        let line = line?;
        let mut fields = line.split('\t').skip(3);
        match (fields.next(), fields.next()) {
            (Some(reference), Some(alt)) => alleles.push((reference.to_string(), alt.to_string())),
            _ => return Err(eyre!("Dose record has no REF and ALT columns: {line:?}")),
        }
    }

    Ok(alleles)
}

pub fn read_dosage_matrix(path: &Path) -> Result<DosageMatrix> {
    let mut rdr = get_tsv_reader(get_input(Some(path.to_path_buf()))?, true);

    let header: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    ensure!(
        header.len() >= 2 && header[0] == "CHROM" && header[1] == "POS",
        "Dosage matrix {path:?} should start with the columns CHROM and POS"
    );

    let rows = rdr
        .records()
        .map(|record| Ok(record?.iter().map(String::from).collect()))
        .collect::<Result<Vec<Vec<String>>>>()?;

    Ok(DosageMatrix { header, rows })
}

/// Inner join on (SNP, REF0, ALT1) with the info table as the left side
pub fn join(
    info: &[SnpKey],
    matrix: &DosageMatrix,
    alleles: &[(String, String)],
) -> Result<DosageTable> {
    ensure!(
        matrix.rows.len() == alleles.len(),
        DosageRows((alleles.len(), matrix.rows.len()))
    );

    let mut index: HashMap<SnpKey, Vec<usize>> = HashMap::new();
    for (i, (row, (reference, alt))) in matrix.rows.iter().zip(alleles).enumerate() {
        let (Some(chrom), Some(pos)) = (row.first(), row.get(1)) else {
            return Err(eyre!("Dosage matrix row {} has no CHROM and POS", i + 1));
        };
        let key = (format!("{chrom}:{pos}"), reference.clone(), alt.clone());
        index.entry(key).or_default().push(i);
    }

    let mut rows = vec![];
    for key in info {
        for i in index.get(key).into_iter().flatten() {
            let mut row = vec![key.0.clone(), key.1.clone(), key.2.clone()];
            row.extend(matrix.rows[*i].iter().cloned());
            rows.push(row);
        }
    }

    let header = KEY_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .chain(matrix.header.iter().cloned())
        .collect();

    Ok(DosageTable { header, rows })
}

pub fn check_shape(table: &DosageTable, matrix: &DosageMatrix) -> Result<()> {
    let (rows, cols) = matrix.shape();
    let expected = (rows, cols + KEY_COLUMNS.len());

    match table.shape() == expected {
        true => Ok(()),
        false => Err(ShapeMismatch((expected, table.shape())).into()),
    }
}

pub fn write_table(table: &DosageTable, out: PathBuf) -> Result<()> {
    let mut wrtr = open_strict_tsv_writer(out)?;
    wrtr.write_record(&table.header)?;
    for row in &table.rows {
        wrtr.write_record(row)?;
    }
    wrtr.flush()?;
    Ok(())
}

/// Combine the chromosome files, make the dosage matrix and annotate it with the info alleles
#[tracing::instrument(skip(tools))]
pub fn run(tools: &impl Toolbox, folder: &Path, out: &Path, workdir: &Path) -> Result<()> {
    tracing::info!("Combining individual VCF files");
    let args = CombineArgs {
        folder: folder.to_path_buf(),
        output: workdir.to_path_buf(),
        ..Default::default()
    };
    let combined = combine::run(tools, &args)?;

    tracing::info!("Generating dosage file");
    let matrix_path = tools.extract_format_field(&combined.dose, "DS", &args.prefix_path())?;

    tracing::info!("Making final dosage file");
    let info = read_info_alleles(&combined.info)?;
    let alleles = read_dose_alleles(&combined.dose)?;
    let matrix = read_dosage_matrix(&matrix_path)
        .wrap_err(eyre!("Failed reading the dosage matrix {matrix_path:?}"))?;

    let table = join(&info, &matrix, &alleles)?;
    check_shape(&table, &matrix)?;

    tracing::info!("Writing out {}", out.display());
    write_table(&table, out.to_path_buf())?;

    Ok(())
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    fn key(snp: &str, r: &str, a: &str) -> SnpKey {
        (snp.to_string(), r.to_string(), a.to_string())
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn matrix() -> DosageMatrix {
        DosageMatrix {
            header: strings(&["CHROM", "POS", "S1", "S2"]),
            rows: vec![
                strings(&["1", "100", "0.1", "1.9"]),
                strings(&["1", "200", "1.0", "0.0"]),
            ],
        }
    }

    fn alleles() -> Vec<(String, String)> {
        vec![("A".into(), "G".into()), ("C".into(), "T".into())]
    }

    #[test]
    fn test_join() {
        let info = vec![key("1:100", "A", "G"), key("1:200", "C", "T")];
        let table = join(&info, &matrix(), &alleles()).unwrap();

        assert_eq!(table.header, strings(&["SNP", "REF0", "ALT1", "CHROM", "POS", "S1", "S2"]));
        assert_eq!(table.rows[1], strings(&["1:200", "C", "T", "1", "200", "1.0", "0.0"]));
        assert!(check_shape(&table, &matrix()).is_ok());
    }

    #[test]
    fn test_join_drops_allele_mismatch() {
        let info = vec![key("1:100", "A", "G"), key("1:200", "C", "G")];
        let table = join(&info, &matrix(), &alleles()).unwrap();

        assert_eq!(table.shape(), (1, 7));
        let err = check_shape(&table, &matrix()).unwrap_err();
        assert!(err.to_string().contains("dropped or duplicated rows"));
    }

    #[test]
    fn test_join_duplicated_info_rows() {
        let info = vec![key("1:100", "A", "G"), key("1:100", "A", "G"), key("1:200", "C", "T")];
        let table = join(&info, &matrix(), &alleles()).unwrap();

        assert_eq!(table.shape(), (3, 7));
        assert!(check_shape(&table, &matrix()).is_err());
    }

    #[test]
    fn test_join_row_mismatch() {
        let info = vec![key("1:100", "A", "G")];
        let err = join(&info, &matrix(), &alleles()[..1]).unwrap_err();
        assert!(matches!(err.downcast_ref::<crate::error::DoseError>(), Some(DosageRows((1, 2)))));
        assert!(err.to_string().starts_with("Mismatched dose file and dosage matrix"));
    }
}
