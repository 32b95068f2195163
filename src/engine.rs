use crate::audio::{AudioEngine, PolySynth, Renderer, SynthConfig, TransportClock};
use crate::error::AudioError;
use crate::events::{EngineCommand, EventId, ScheduledTrigger, Trigger};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam::channel::{Receiver, Sender};
use std::sync::Arc;

/// Audio engine playing through the default cpal output device.
///
/// The control side only sends commands; the transport position is read back
/// from the sample counter the audio callback publishes.
pub struct SynthEngine {
    command_tx: Sender<EngineCommand>,
    clock: Arc<TransportClock>,
    sample_rate: f32,
    running: bool,
    /// Transport runs started so far; advances with every stop.
    run: u64,
    next_id: u64,
    _stream: cpal::Stream,
}

impl SynthEngine {
    pub fn new(config: &SynthConfig) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let supported = device.default_output_config()?;
        let stream_config: cpal::StreamConfig = supported.into();

        let num_channels = stream_config.channels as usize;
        let sample_rate = stream_config.sample_rate.0 as f32;
        tracing::info!(
            "Audio output: {} channels, {} Hz",
            num_channels,
            sample_rate
        );

        let (command_tx, command_rx) = crossbeam::channel::unbounded();
        let clock = Arc::new(TransportClock::new());

        let mut renderer = Renderer::new(
            PolySynth::new(config.clone(), sample_rate),
            num_channels,
            clock.clone(),
        );

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                audio_callback(data, &mut renderer, &command_rx);
            },
            |err| tracing::error!("Audio error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(Self {
            command_tx,
            clock,
            sample_rate,
            running: false,
            run: 0,
            next_id: 0,
            _stream: stream,
        })
    }

    fn send(&self, command: EngineCommand) {
        if self.command_tx.send(command).is_err() {
            tracing::warn!("Audio callback is gone, dropping command");
        }
    }
}

fn audio_callback(data: &mut [f32], renderer: &mut Renderer, command_rx: &Receiver<EngineCommand>) {
    while let Ok(command) = command_rx.try_recv() {
        renderer.handle(command);
    }
    renderer.process(data);
}

impl AudioEngine for SynthEngine {
    fn now(&self) -> f64 {
        if !self.running {
            return 0.0;
        }
        self.clock.position(self.run) as f64 / self.sample_rate as f64
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) {
        self.running = true;
        self.send(EngineCommand::Start);
    }

    fn stop(&mut self) {
        self.running = false;
        self.run += 1;
        self.clock.publish(self.run, 0);
        self.send(EngineCommand::Stop);
    }

    fn schedule(&mut self, at: f64, trigger: Trigger) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        let sample_timestamp = (at.max(0.0) * self.sample_rate as f64).round() as u64;
        self.send(EngineCommand::Schedule(ScheduledTrigger {
            id,
            sample_timestamp,
            trigger,
        }));
        id
    }

    fn cancel(&mut self, id: EventId) {
        self.send(EngineCommand::Cancel(id));
    }
}
