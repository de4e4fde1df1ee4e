//! Filesystem operation tools: createFolder, writeToFile, applyDiffEdit,
//! readFiles, moveFile, copyFile

use std::fs;

use serde_json::json;
use tracing::debug;

use toolbelt_domain::{ToolError, ToolResult};

/// Tool name constants
pub const CREATE_FOLDER: &str = "createFolder";
pub const WRITE_TO_FILE: &str = "writeToFile";
pub const APPLY_DIFF_EDIT: &str = "applyDiffEdit";
pub const READ_FILES: &str = "readFiles";
pub const MOVE_FILE: &str = "moveFile";
pub const COPY_FILE: &str = "copyFile";

/// Execute the createFolder tool — create a directory and any missing
/// parents.
pub fn execute_create_folder(folder_path: &str) -> Result<ToolResult, ToolError> {
    fs::create_dir_all(folder_path)
        .map_err(|e| ToolError::io(format!("Error creating folder: {e}")))?;

    debug!(path = folder_path, "folder created");
    Ok(ToolResult::success(CREATE_FOLDER).with_message(format!("Folder created: {folder_path}")))
}

/// Execute the writeToFile tool — create or truncate the file.
pub fn execute_write_to_file(file_path: &str, content: &str) -> Result<ToolResult, ToolError> {
    fs::write(file_path, content).map_err(|e| ToolError::io(format!("Error writing to file: {e}")))?;

    debug!(path = file_path, bytes = content.len(), "file written");
    Ok(ToolResult::success(WRITE_TO_FILE)
        .with_message(format!("Content written to file: {file_path}\n\n{content}")))
}

/// Execute the applyDiffEdit tool — replace the **first** occurrence of
/// `original_text` in the file at `path`.
///
/// "Text not found" is an expected, recoverable outcome for the agent, so
/// it is reported in-band as a `success: false` envelope rather than
/// raised, and the file is left untouched. I/O failures are reported the
/// same way — this operation never raises.
pub fn execute_apply_diff_edit(
    path: &str,
    original_text: &str,
    updated_text: &str,
) -> Result<ToolResult, ToolError> {
    let file_content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return Ok(ToolResult::failure_text(APPLY_DIFF_EDIT, e.to_string())),
    };

    if !file_content.contains(original_text) {
        return Ok(ToolResult::failure_text(
            APPLY_DIFF_EDIT,
            "Original text not found in file",
        ));
    }

    let new_content = file_content.replacen(original_text, updated_text, 1);
    if let Err(e) = fs::write(path, new_content) {
        return Ok(ToolResult::failure_text(APPLY_DIFF_EDIT, e.to_string()));
    }

    debug!(path, "diff edit applied");
    Ok(ToolResult::success(APPLY_DIFF_EDIT)
        .with_message("Successfully applied diff edit")
        .with_result(json!({
            "path": path,
            "originalText": original_text,
            "updatedText": updated_text,
        })))
}

/// Execute the readFiles tool — read every path into one concatenated
/// report, one section per file, each headed by the path and an underline
/// of matching length.
///
/// All-or-nothing: a single unreadable path fails the whole call.
pub fn execute_read_files(file_paths: &[String]) -> Result<ToolResult, ToolError> {
    let mut report = String::new();
    for path in file_paths {
        let content = fs::read_to_string(path)
            .map_err(|e| ToolError::io(format!("Error reading multiple files: {e}")))?;
        report.push_str(&format!(
            "File: {path}\n{}\n{content}\n\n",
            "=".repeat(path.len() + 6)
        ));
    }

    Ok(ToolResult::success(READ_FILES).with_message(report))
}

/// Execute the moveFile tool.
pub fn execute_move_file(source: &str, destination: &str) -> Result<ToolResult, ToolError> {
    fs::rename(source, destination).map_err(|e| ToolError::io(format!("Error moving file: {e}")))?;

    Ok(ToolResult::success(MOVE_FILE)
        .with_message(format!("File moved: {source} to {destination}")))
}

/// Execute the copyFile tool.
pub fn execute_copy_file(source: &str, destination: &str) -> Result<ToolResult, ToolError> {
    fs::copy(source, destination).map_err(|e| ToolError::io(format!("Error copying file: {e}")))?;

    Ok(ToolResult::success(COPY_FILE)
        .with_message(format!("File copied: {source} to {destination}")))
}
