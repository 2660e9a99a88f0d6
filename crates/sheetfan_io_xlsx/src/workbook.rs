//! Workbook container: worksheet directory, format registry and final assembly.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{info, warn};

use crate::report::SpecWorkbookReport;
use crate::spec::{EnumWorkbookMemoryMode, SpecCellFormat, XlsxFanoutError};
use crate::util::{derive_xlsx_error, validate_sheet_name};
use crate::writer::derive_rust_xlsx_format;

////////////////////////////////////////////////////////////////////////////////
// #region FormatRegistry

/// Stable reference to a registered format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatHandle(usize);

/// Named format registry shared read-only by all writer tasks.
///
/// Identical specs are stored once; several names may point at one handle.
#[derive(Debug, Default)]
pub struct SpecFormatRegistry {
    l_formats: Vec<(SpecCellFormat, Format)>,
    dict_handles: BTreeMap<String, FormatHandle>,
}

impl SpecFormatRegistry {
    /// Register `spec` under `name`.
    ///
    /// Re-registering the same name with the same spec returns the original
    /// handle; a different spec under a taken name is a conflict.
    pub fn register(
        &mut self,
        name: &str,
        spec: SpecCellFormat,
    ) -> Result<FormatHandle, XlsxFanoutError> {
        if let Some(handle) = self.dict_handles.get(name) {
            if self.l_formats[handle.0].0 == spec {
                return Ok(*handle);
            }
            return Err(XlsxFanoutError::FormatConflict {
                name: name.to_string(),
            });
        }

        let handle = match self.l_formats.iter().position(|(spec_old, _)| *spec_old == spec) {
            Some(n_idx) => FormatHandle(n_idx),
            None => {
                let format = derive_rust_xlsx_format(&spec);
                self.l_formats.push((spec, format));
                FormatHandle(self.l_formats.len() - 1)
            }
        };
        self.dict_handles.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Handle registered under `name`.
    pub fn handle(&self, name: &str) -> Option<FormatHandle> {
        self.dict_handles.get(name).copied()
    }

    /// Backend format behind `handle`.
    pub fn get(&self, handle: FormatHandle) -> Option<&Format> {
        self.l_formats.get(handle.0).map(|(_, format)| format)
    }

    /// Backend format registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<&Format, XlsxFanoutError> {
        self.handle(name)
            .and_then(|handle| self.get(handle))
            .ok_or_else(|| XlsxFanoutError::FormatNotRegistered {
                name: name.to_string(),
            })
    }

    /// Number of distinct stored formats.
    pub fn len(&self) -> usize {
        self.l_formats.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.l_formats.is_empty()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorksheetHandles

/// Worksheet position and name inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    n_idx: usize,
    sheet_name: String,
}

impl SheetHandle {
    /// Zero-based position in the workbook.
    pub fn index(&self) -> usize {
        self.n_idx
    }

    /// Worksheet name.
    pub fn name(&self) -> &str {
        &self.sheet_name
    }
}

/// Exclusive write access to one worksheet during the fan-out.
///
/// Targets borrow the container mutably, so the container cannot add sheets or
/// close while any target is alive.
pub struct SheetWriteTarget<'a> {
    handle: &'a SheetHandle,
    worksheet: &'a mut Worksheet,
}

impl SheetWriteTarget<'_> {
    /// Handle of the target worksheet.
    pub fn handle(&self) -> &SheetHandle {
        self.handle
    }

    /// Worksheet name.
    pub fn sheet_name(&self) -> &str {
        self.handle.name()
    }

    /// Mutable worksheet access.
    pub fn worksheet(&mut self) -> &mut Worksheet {
        self.worksheet
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkbookContainer

/// Workbook container bound to one output path.
///
/// Nothing touches the filesystem until [`Self::close`], which writes the
/// whole workbook to a temp file next to the target and renames it into place.
pub struct XlsxWorkbook {
    path_file_out: PathBuf,
    memory_mode: EnumWorkbookMemoryMode,
    workbook: Workbook,
    registry: SpecFormatRegistry,
    l_sheet_handles: Vec<SheetHandle>,
    set_sheet_names_existing: BTreeSet<String>,
    if_closed: bool,
}

impl XlsxWorkbook {
    /// Create a container targeting `path_file_out`.
    pub fn create<P>(path_file_out: P, memory_mode: EnumWorkbookMemoryMode) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            path_file_out: path_file_out.as_ref().to_path_buf(),
            memory_mode,
            workbook: Workbook::new(),
            registry: SpecFormatRegistry::default(),
            l_sheet_handles: Vec::new(),
            set_sheet_names_existing: BTreeSet::new(),
            if_closed: false,
        }
    }

    /// Output file path.
    pub fn file_out(&self) -> &Path {
        &self.path_file_out
    }

    /// Worksheet serialization mode.
    pub fn memory_mode(&self) -> EnumWorkbookMemoryMode {
        self.memory_mode
    }

    /// Whether [`Self::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.if_closed
    }

    /// Worksheet handles in workbook order.
    pub fn sheets(&self) -> &[SheetHandle] {
        &self.l_sheet_handles
    }

    /// Shared format registry.
    pub fn format_registry(&self) -> &SpecFormatRegistry {
        &self.registry
    }

    /// Register a named format. See [`SpecFormatRegistry::register`].
    pub fn register_format(
        &mut self,
        name: &str,
        spec: SpecCellFormat,
    ) -> Result<FormatHandle, XlsxFanoutError> {
        self.ensure_open()?;
        self.registry.register(name, spec)
    }

    /// Append a worksheet named `name`.
    ///
    /// Names follow Excel rules and must be unique ignoring case.
    pub fn add_worksheet(&mut self, name: &str) -> Result<SheetHandle, XlsxFanoutError> {
        self.ensure_open()?;
        validate_sheet_name(name).map_err(|reason| XlsxFanoutError::InvalidSheetName {
            name: name.to_string(),
            reason,
        })?;
        let c_name_key = name.to_lowercase();
        if self.set_sheet_names_existing.contains(&c_name_key) {
            return Err(XlsxFanoutError::InvalidSheetName {
                name: name.to_string(),
                reason: "sheet name already exists in workbook.".to_string(),
            });
        }

        let worksheet = match self.memory_mode {
            EnumWorkbookMemoryMode::Standard => self.workbook.add_worksheet(),
            EnumWorkbookMemoryMode::LowMemory => self.workbook.add_worksheet_with_low_memory(),
            EnumWorkbookMemoryMode::ConstantMemory => {
                self.workbook.add_worksheet_with_constant_memory()
            }
        };
        worksheet.set_name(name).map_err(derive_xlsx_error)?;

        self.set_sheet_names_existing.insert(c_name_key);
        let handle = SheetHandle {
            n_idx: self.l_sheet_handles.len(),
            sheet_name: name.to_string(),
        };
        self.l_sheet_handles.push(handle.clone());
        Ok(handle)
    }

    /// Split the container into one exclusive write target per worksheet plus
    /// the shared read-only format registry.
    pub fn split_for_write(
        &mut self,
    ) -> Result<(Vec<SheetWriteTarget<'_>>, &SpecFormatRegistry), XlsxFanoutError> {
        self.ensure_open()?;
        let registry = &self.registry;
        let l_targets = self
            .workbook
            .worksheets_mut()
            .iter_mut()
            .zip(self.l_sheet_handles.iter())
            .map(|(worksheet, handle)| SheetWriteTarget { handle, worksheet })
            .collect();
        Ok((l_targets, registry))
    }

    /// Assemble the workbook and write it to the output path.
    ///
    /// May be called once. The file appears at the output path only after the
    /// complete workbook has been written and synced.
    pub fn close(&mut self) -> Result<SpecWorkbookReport, XlsxFanoutError> {
        self.ensure_open()?;
        self.if_closed = true;

        let path_file_out = self.path_file_out.clone();
        let derive_write_failure = |message: String| XlsxFanoutError::ContainerWriteFailure {
            path: path_file_out.clone(),
            message,
        };

        let path_dir_out = match path_file_out.parent() {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut file_tmp = tempfile::Builder::new()
            .prefix(".sheetfan-")
            .suffix(".xlsx.tmp")
            .tempfile_in(&path_dir_out)
            .map_err(|err| derive_write_failure(err.to_string()))?;

        self.workbook
            .save_to_writer(file_tmp.as_file_mut())
            .map_err(|err| derive_write_failure(err.to_string()))?;
        file_tmp
            .as_file()
            .sync_all()
            .map_err(|err| derive_write_failure(err.to_string()))?;
        file_tmp
            .persist(&path_file_out)
            .map_err(|err| derive_write_failure(err.error.to_string()))?;

        let sheet_names: Vec<String> = self
            .l_sheet_handles
            .iter()
            .map(|handle| handle.sheet_name.clone())
            .collect();
        info!(
            path = %path_file_out.display(),
            n_sheets = sheet_names.len(),
            memory_mode = %self.memory_mode,
            "Workbook closed"
        );

        Ok(SpecWorkbookReport {
            path_file_out,
            sheet_names,
            memory_mode: self.memory_mode,
        })
    }

    fn ensure_open(&self) -> Result<(), XlsxFanoutError> {
        if self.if_closed {
            return Err(XlsxFanoutError::ContainerClosed {
                path: self.path_file_out.clone(),
            });
        }
        Ok(())
    }
}

impl Drop for XlsxWorkbook {
    fn drop(&mut self) {
        if !self.if_closed && !self.l_sheet_handles.is_empty() {
            warn!(
                path = %self.path_file_out.display(),
                "Workbook discarded without close(); no output written."
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
