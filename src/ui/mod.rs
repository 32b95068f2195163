use crate::audio::SynthConfig;
use crate::engine::SynthEngine;
use crate::error::PlaybackError;
use crate::session::{SessionDriver, SourceFile, Status};
use crate::timing::PlaybackScheduler;
use eframe::egui;
use std::time::Duration;

const PLAYBACK_FAILED: &str = "Failed to parse or play MIDI file.";

pub struct MidiaApp {
    driver: SessionDriver,
    synth_config: SynthConfig,
    /// Created on the first play request and kept for the whole process.
    scheduler: Option<PlaybackScheduler<SynthEngine>>,
    file_message: Option<String>,
    playback_error: Option<String>,
}

impl MidiaApp {
    pub fn new(driver: SessionDriver, synth_config: SynthConfig) -> Self {
        Self {
            driver,
            synth_config,
            scheduler: None,
            file_message: None,
            playback_error: None,
        }
    }

    fn is_playing(&self) -> bool {
        self.scheduler.as_ref().is_some_and(|s| s.is_playing())
    }

    fn pick_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select a MIDI file")
            .add_filter("MIDI", &["mid", "midi"])
            .pick_file()
        else {
            return;
        };

        match SourceFile::read(&path) {
            Ok(file) => {
                self.stop();
                self.driver.select_file(file);
                self.file_message = None;
                self.playback_error = None;
            }
            Err(e) => {
                self.file_message = Some(e.to_string());
            }
        }
    }

    fn process(&mut self) {
        if let Err(e) = self.driver.submit() {
            self.file_message = Some(e.to_string());
        }
    }

    fn play(&mut self) {
        let Some(processed) = self.driver.session().processed() else {
            return;
        };

        if self.scheduler.is_none() {
            match SynthEngine::new(&self.synth_config) {
                Ok(engine) => {
                    self.scheduler = Some(
                        PlaybackScheduler::new(engine)
                            .with_release_tail(self.synth_config.adsr.release as f64),
                    );
                }
                Err(e) => {
                    tracing::error!("Audio engine unavailable: {}", e);
                    self.playback_error = Some(format!("Audio unavailable: {}", e));
                    return;
                }
            }
        }
        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };

        match scheduler.play(processed) {
            Ok(_) => self.playback_error = None,
            Err(PlaybackError::MalformedMidi(e)) => {
                tracing::error!("Playback error: {}", e);
                self.playback_error = Some(PLAYBACK_FAILED.to_string());
            }
        }
    }

    fn stop(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.stop();
        }
    }

    fn download(&mut self) {
        let download = match self.driver.request_download() {
            Ok(download) => download,
            Err(e) => {
                self.file_message = Some(e.to_string());
                return;
            }
        };

        let Some(path) = rfd::FileDialog::new()
            .set_title("Save processed MIDI")
            .set_file_name(&download.file_name)
            .add_filter("MIDI", &["mid", "midi"])
            .save_file()
        else {
            return;
        };

        self.file_message = Some(match std::fs::write(&path, download.data) {
            Ok(()) => {
                tracing::info!("Saved {}", path.display());
                format!("Saved {}", path.display())
            }
            Err(e) => format!("Failed to save {}: {}", path.display(), e),
        });
    }

    fn upload_section(&mut self, ui: &mut egui::Ui) {
        let processing = self.driver.session().status() == Status::Processing;

        ui.label("1. Upload a MIDI File (.mid)");
        if ui
            .add_enabled(!processing, egui::Button::new("Choose file..."))
            .clicked()
        {
            self.pick_file();
        }
        if let Some(original) = self.driver.session().original() {
            ui.label(format!("Selected: {}", original.name()));
        }

        ui.add_space(8.0);

        let has_file = self.driver.session().original().is_some();
        let label = if processing {
            "Processing..."
        } else {
            "2. Process MIDI"
        };
        ui.horizontal(|ui| {
            if ui
                .add_enabled(has_file && !processing, egui::Button::new(label))
                .clicked()
            {
                self.process();
            }
            if processing {
                ui.spinner();
            }
        });
    }

    fn results_section(&mut self, ui: &mut egui::Ui) {
        ui.separator();
        ui.heading("3. Play or Download");
        ui.horizontal(|ui| {
            if self.is_playing() {
                if ui.button("⏹ Stop").clicked() {
                    self.stop();
                }
            } else if ui.button("▶ Play Processed MIDI").clicked() {
                self.play();
            }

            if ui.button("💾 Download").clicked() {
                self.download();
            }
        });

        if let Some(handle) = self.scheduler.as_ref().and_then(|s| s.handle()) {
            let document = handle.document();
            ui.label(format!(
                "Playing {} notes ({:.1}s)",
                document.note_count(),
                document.duration()
            ));
        }
    }
}

impl eframe::App for MidiaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.driver.poll();
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.finish_if_done();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("MIDI-A Lightweight Processor");
            });
            ui.add_space(12.0);

            self.upload_section(ui);

            if self.driver.session().status() == Status::Ready {
                self.results_section(ui);
            }

            if let Some(error) = self.driver.session().error() {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::RED, format!("Error: {}", error));
            }
            if let Some(error) = &self.playback_error {
                ui.colored_label(egui::Color32::RED, format!("Playback: {}", error));
            }
            if let Some(message) = &self.file_message {
                ui.label(message);
            }
        });

        if self.driver.session().status() == Status::Processing || self.is_playing() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
