// DOSETK - Imputation dose toolkit
// Copyright (C) 2024  Osma S. Rautila
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//
//
//

//! DOSETK - Imputation dose toolkit
//!
//! Post-processing of per-chromosome imputation output (dose VCFs and info files).
//! The heavy lifting on variant files is done by external programs, which need to be in PATH
//! or given explicitly on the command line:
//!
//! * `vcf-concat` for combining dose files
//! * `tabix` for indexed position lookups
//! * `vcftools` for extracting the DS FORMAT field
//! * optionally `Rscript` with a duplicate resolution script
//!
//! # Running DOSETK
//!
//! To print the available commands use:
//! ```bash
//! dosetk --help
//! ```
//!
//! Combine a folder of chromosome files into `combined.dose.txt` and `combined.info.txt`:
//! ```bash
//! dosetk combine --folder $imputed --outdir $outdir
//! ```
//!
//! Extract SNPs (rows of `chr:pos effect_allele noneffect_allele`) from every chromosome:
//! ```bash
//! dosetk extract --snp_list snps.txt --vcf_dir $imputed --out_dir ${outdir}/filtered
//! ```
//!
//! Make an annotated per-sample dosage table:
//! ```bash
//! dosetk make-dose --folder $imputed --workdir $outdir --out ${outdir}/final_dose.txt
//! ```

#[doc(hidden)]
pub mod args;

#[doc(hidden)]
pub mod io;

/// External program seam
pub mod tools;

/// Built-in duplicate SNP resolution
pub mod dedup;

/// DOSETK structs
pub mod structs;

#[doc(hidden)]
pub mod utils;

#[doc(hidden)]
pub mod error;

#[cfg(feature = "clap")]
pub mod clap;
