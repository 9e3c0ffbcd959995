//! Writing downloads to disk (native) or to the browser (WASM).
//!
//! Requests are queued as a [`PendingDownload`] and produced at the start of
//! the next frame. Native saves go through an `rfd` dialog on the tokio runtime
//! and report back over a channel; WASM downloads are synchronous.

use super::state::{FileOperationResult, MindMapApp, PendingDownload};
use crate::document::MAP_FILE_NAME;
use crate::error::ExportError;
use crate::export::{self, ExportFormat};
use eframe::egui;

/// A finished file waiting to be handed to the platform.
struct Download {
    file_name: String,
    filter_name: &'static str,
    extension: &'static str,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl MindMapApp {
    /// Queues a JSON download of the map.
    pub fn download_map(&mut self) {
        self.file.pending = Some(PendingDownload::Map);
    }

    /// Queues a screenshot in the given format.
    pub fn take_screenshot(&mut self, format: ExportFormat) {
        self.file.pending = Some(PendingDownload::Screenshot(format));
    }

    /// Drains finished save tasks and starts the queued download, if any.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.receiver.try_recv() {
            match result {
                FileOperationResult::SaveCompleted(path) => {
                    log::info!("saved {path}");
                    self.notifications.success(format!("Saved {path}"));
                }
                FileOperationResult::Cancelled => {
                    log::debug!("save dialog dismissed");
                }
                FileOperationResult::OperationFailed(error) => {
                    log::error!("save failed: {error}");
                    self.notifications.error(error);
                }
            }
        }

        let Some(pending) = self.file.pending.take() else {
            return;
        };
        match self.build_download(pending) {
            Ok(download) => self.deliver(ctx, download),
            Err(err) => {
                log::error!("export failed: {err}");
                self.notifications.error(format!("Export failed: {err}"));
            }
        }
    }

    fn build_download(&self, pending: PendingDownload) -> Result<Download, ExportError> {
        match pending {
            PendingDownload::Map => Ok(Download {
                file_name: MAP_FILE_NAME.to_string(),
                filter_name: "JSON",
                extension: "json",
                mime_type: "application/json",
                bytes: self.map.to_json()?.into_bytes(),
            }),
            PendingDownload::Screenshot(format) => {
                if self.map.is_empty() {
                    log::warn!("screenshot of an empty map");
                }
                let mut options = self.settings.export_options();
                options.highlight_selection = false;
                Ok(Download {
                    file_name: format.file_name(),
                    filter_name: format.label(),
                    extension: format.extension(),
                    mime_type: format.mime_type(),
                    bytes: export::export_image(&self.map, format, &options)?,
                })
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn deliver(&mut self, ctx: &egui::Context, download: Download) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                let err = ExportError::Dialog(err.to_string());
                log::error!("{err}");
                self.notifications.error(err.to_string());
                return;
            }
        };

        log::debug!("saving {} ({})", download.file_name, download.mime_type);
        let ctx = ctx.clone();
        let sender = self.file.sender.clone();
        handle.spawn(async move {
            let result = match rfd::AsyncFileDialog::new()
                .add_filter(download.filter_name, &[download.extension])
                .set_file_name(&download.file_name)
                .save_file()
                .await
            {
                Some(handle) => {
                    let path = handle.path();
                    match std::fs::write(path, &download.bytes) {
                        Ok(()) => FileOperationResult::SaveCompleted(path.display().to_string()),
                        Err(e) => FileOperationResult::OperationFailed(
                            ExportError::Io(e).to_string(),
                        ),
                    }
                }
                None => FileOperationResult::Cancelled,
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn deliver(&mut self, ctx: &egui::Context, download: Download) {
        log::debug!(
            "downloading {} ({} .{})",
            download.file_name,
            download.filter_name,
            download.extension
        );
        let result = match Self::trigger_download(&download.file_name, download.mime_type, &download.bytes) {
            Ok(()) => FileOperationResult::SaveCompleted(download.file_name),
            Err(e) => FileOperationResult::OperationFailed(ExportError::Dialog(e).to_string()),
        };
        let _ = self.file.sender.send(result);
        ctx.request_repaint();
    }

    /// Triggers a file download in the browser through a temporary anchor and blob URL.
    #[cfg(target_arch = "wasm32")]
    fn trigger_download(filename: &str, mime_type: &str, bytes: &[u8]) -> Result<(), String> {
        use eframe::wasm_bindgen::JsCast;

        let window = web_sys::window().ok_or("No window found")?;
        let document = window.document().ok_or("No document found")?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&js_sys::Uint8Array::from(bytes));

        let blob_options = web_sys::BlobPropertyBag::new();
        blob_options.set_type(mime_type);

        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &blob_options)
            .map_err(|_| "Failed to create blob")?;

        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Failed to create object URL")?;

        let anchor = document
            .create_element("a")
            .map_err(|_| "Failed to create anchor element")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "Failed to cast to anchor element")?;

        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        let body = document.body().ok_or("No body found")?;
        body.append_child(&anchor)
            .map_err(|_| "Failed to append anchor")?;
        anchor.click();
        body.remove_child(&anchor)
            .map_err(|_| "Failed to remove anchor")?;

        web_sys::Url::revoke_object_url(&url).map_err(|_| "Failed to revoke object URL")?;
        Ok(())
    }
}
