//! Video playback through the `ffmpeg` command-line tools.
//!
//! `ffprobe` reports the stream geometry and frame rate. Two `ffmpeg`
//! children then stream raw RGBA frames and interleaved stereo `f32le`
//! samples over pipes; a reader thread per pipe hands complete buffers to
//! the main thread through bounded channels. Playback is paced by
//! [`MediaBackend::advance`]: the clock only moves when the application
//! says time has passed.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError, sync_channel};
use std::thread;

use log::{debug, info, warn};
use sdl2::audio::AudioQueue;
use serde::Deserialize;

use duotone_types::backend::{MediaBackend, PlaybackState, VideoFrame};
use duotone_types::error::{DuotoneError, Result};

pub const SAMPLE_RATE: u32 = 48_000;
pub const CHANNELS: u16 = 2;

/// Frames decoded ahead of the playhead.
const FRAME_BACKLOG: usize = 4;
/// Samples per audio chunk (interleaved).
const AUDIO_CHUNK: usize = 4096;
const AUDIO_BACKLOG: usize = 16;
/// Keep this much audio queued on the device.
const AUDIO_LEAD_SECS: f32 = 0.25;
const FALLBACK_FPS: f64 = 30.0;

/// Where decoded samples go.
pub trait AudioSink {
    fn push(&mut self, samples: &[f32]) -> Result<()>;

    /// Seconds of audio still waiting to be played.
    fn queued_secs(&self) -> f32;

    fn set_paused(&mut self, paused: bool);

    fn clear(&mut self);
}

impl AudioSink for AudioQueue<f32> {
    fn push(&mut self, samples: &[f32]) -> Result<()> {
        self.queue_audio(samples).map_err(DuotoneError::Media)
    }

    fn queued_secs(&self) -> f32 {
        let spec = self.spec();
        let bytes_per_sec = spec.freq.max(1) as f32 * spec.channels.max(1) as f32 * 4.0;
        self.size() as f32 / bytes_per_sec
    }

    fn set_paused(&mut self, paused: bool) {
        if paused {
            self.pause();
        } else {
            self.resume();
        }
    }

    fn clear(&mut self) {
        AudioQueue::clear(self);
    }
}

/// Geometry and timing of an opened file.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub has_audio: bool,
}

impl StreamInfo {
    fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Running decoder for one pass over a file.
pub struct Decoder {
    pub info: StreamInfo,
    frames: Receiver<Vec<u8>>,
    audio: Option<Receiver<Vec<f32>>>,
    children: Vec<Child>,
}

impl Decoder {
    /// A decoder fed by caller-owned channels, with no child processes.
    pub fn from_channels(
        info: StreamInfo,
        frames: Receiver<Vec<u8>>,
        audio: Option<Receiver<Vec<f32>>>,
    ) -> Self {
        Self {
            info,
            frames,
            audio,
            children: Vec::new(),
        }
    }

    /// Tie `child` to this decoder's lifetime and hand back its stdout.
    fn adopt(&mut self, mut child: Child, what: &str) -> Result<ChildStdout> {
        let stdout = child.stdout.take();
        self.children.push(child);
        stdout.ok_or_else(|| DuotoneError::Media(format!("ffmpeg {what} pipe unavailable")))
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        for child in &mut self.children {
            // Already exited is fine.
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Opens a decoder for a path.
pub type OpenFn = fn(&Path) -> Result<Decoder>;

struct Stream {
    path: PathBuf,
    decoder: Decoder,
    frame: Option<Vec<u8>>,
    /// Seconds of playback since the stream (re)started.
    clock: f64,
    /// Clock time at which the next frame is due.
    next_frame_at: f64,
}

/// [`MediaBackend`] backed by `ffmpeg`/`ffprobe` child processes.
pub struct FfmpegMedia {
    open: OpenFn,
    sink: Option<Box<dyn AudioSink>>,
    stream: Option<Stream>,
    state: PlaybackState,
    looping: bool,
    volume: f32,
    sequence: u64,
}

impl FfmpegMedia {
    /// Create a player. Without a sink the audio track is ignored.
    pub fn new(sink: Option<Box<dyn AudioSink>>) -> Self {
        Self::with_opener(spawn_decoder, sink)
    }

    pub fn with_opener(open: OpenFn, sink: Option<Box<dyn AudioSink>>) -> Self {
        Self {
            open,
            sink,
            stream: None,
            state: PlaybackState::Stopped,
            looping: false,
            volume: 1.0,
            sequence: 0,
        }
    }

    pub fn info(&self) -> Option<&StreamInfo> {
        self.stream.as_ref().map(|s| &s.decoder.info)
    }

    /// Start the loaded file over from its first frame.
    fn restart(&mut self) -> Result<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(());
        };
        let decoder = (self.open)(&stream.path)?;
        debug!("restarting {}", stream.path.display());
        stream.decoder = decoder;
        stream.clock = 0.0;
        stream.next_frame_at = 0.0;
        Ok(())
    }

    /// Pull due frames. Returns `false` at end of stream.
    fn pull_frames(&mut self) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            return true;
        };
        let interval = 1.0 / stream.decoder.info.fps;
        while stream.clock >= stream.next_frame_at {
            match stream.decoder.frames.try_recv() {
                Ok(frame) => {
                    stream.frame = Some(frame);
                    self.sequence += 1;
                    stream.next_frame_at += interval;
                },
                // Decoder is behind; show the last frame a little longer.
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
        true
    }

    /// Top up the device queue from the audio pipe.
    fn pump_audio(&mut self) {
        let (Some(stream), Some(sink)) = (self.stream.as_ref(), self.sink.as_mut()) else {
            return;
        };
        let Some(audio) = stream.decoder.audio.as_ref() else {
            return;
        };
        while sink.queued_secs() < AUDIO_LEAD_SECS {
            let Ok(mut chunk) = audio.try_recv() else {
                break;
            };
            for sample in &mut chunk {
                *sample *= self.volume;
            }
            if let Err(e) = sink.push(&chunk) {
                warn!("audio queue rejected samples: {e}");
                break;
            }
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_paused(state != PlaybackState::Playing);
        }
    }
}

impl MediaBackend for FfmpegMedia {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.unload();
        let decoder = (self.open)(path)?;
        info!(
            "opened {} ({}x{} @ {:.2} fps)",
            path.display(),
            decoder.info.width,
            decoder.info.height,
            decoder.info.fps
        );
        self.stream = Some(Stream {
            path: path.to_path_buf(),
            decoder,
            frame: None,
            clock: 0.0,
            next_frame_at: 0.0,
        });
        self.set_state(PlaybackState::Playing);
        // Show the first frame without waiting for the clock.
        self.advance(0.0);
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!("closed {}", stream.path.display());
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.clear();
        }
        self.set_state(PlaybackState::Stopped);
    }

    fn advance(&mut self, dt: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        stream.clock += f64::from(dt.max(0.0));

        if !self.pull_frames() {
            if !self.looping {
                debug!("end of stream");
                self.set_state(PlaybackState::Stopped);
                return;
            }
            if let Err(e) = self.restart() {
                warn!("failed to loop stream: {e}");
                self.set_state(PlaybackState::Stopped);
                return;
            }
            self.pull_frames();
        }
        self.pump_audio();
    }

    fn state(&self) -> PlaybackState {
        self.state
    }

    fn play(&mut self) {
        if self.stream.is_none() {
            return;
        }
        if self.state == PlaybackState::Stopped {
            if let Err(e) = self.restart() {
                warn!("failed to restart stream: {e}");
                return;
            }
        }
        self.set_state(PlaybackState::Playing);
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.set_state(PlaybackState::Paused);
        }
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Applies to samples queued from now on.
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn current_frame(&self) -> Option<VideoFrame<'_>> {
        let stream = self.stream.as_ref()?;
        let rgba = stream.frame.as_deref()?;
        Some(VideoFrame {
            width: stream.decoder.info.width,
            height: stream.decoder.info.height,
            rgba,
            sequence: self.sequence,
        })
    }
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

#[derive(Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
}

/// Run `ffprobe` on `path`.
pub fn probe(path: &Path) -> Result<StreamInfo> {
    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| DuotoneError::Media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(DuotoneError::Media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe(&out.stdout)
}

fn parse_probe(json: &[u8]) -> Result<StreamInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DuotoneError::Media("no video stream found".into()))?;
    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(DuotoneError::Media("missing video dimensions".into())),
    };
    let fps = [video.avg_frame_rate.as_deref(), video.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(parse_ff_ratio)
        .find(|fps| *fps > 0.0)
        .unwrap_or(FALLBACK_FPS);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));
    Ok(StreamInfo {
        width,
        height,
        fps,
        has_audio,
    })
}

fn parse_ff_ratio(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num = num.parse::<f64>().ok()?;
    let den = den.parse::<f64>().ok()?;
    (den != 0.0).then(|| num / den)
}

/// Read until `buf` is full or the reader hits EOF.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn spawn_ffmpeg(path: &Path, output: &[&str]) -> Result<Child> {
    Command::new("ffmpeg")
        .args(["-v", "error", "-nostdin", "-i"])
        .arg(path)
        .args(output)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| DuotoneError::Media(format!("failed to run ffmpeg: {e}")))
}

/// Probe `path` and start streaming its video and audio.
pub fn spawn_decoder(path: &Path) -> Result<Decoder> {
    let info = probe(path)?;
    let frame_bytes = info.frame_bytes();

    let (frame_tx, frames) = sync_channel(FRAME_BACKLOG);
    // Owned by the decoder from here on, so an early return reaps it.
    let mut decoder = Decoder::from_channels(info, frames, None);
    let video = spawn_ffmpeg(path, &[
        "-an", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1",
    ])?;
    let mut stdout = decoder.adopt(video, "video")?;
    thread::spawn(move || {
        loop {
            let mut frame = vec![0u8; frame_bytes];
            match read_full(&mut stdout, &mut frame) {
                Ok(n) if n == frame_bytes => {
                    if frame_tx.send(frame).is_err() {
                        break;
                    }
                },
                _ => break,
            }
        }
    });

    if decoder.info.has_audio {
        let rate = SAMPLE_RATE.to_string();
        let channels = CHANNELS.to_string();
        let child = spawn_ffmpeg(path, &[
            "-vn", "-f", "f32le", "-acodec", "pcm_f32le", "-ac", channels.as_str(), "-ar", rate.as_str(),
            "pipe:1",
        ])?;
        let mut stdout = decoder.adopt(child, "audio")?;
        let (chunk_tx, chunks) = sync_channel(AUDIO_BACKLOG);
        thread::spawn(move || {
            let mut bytes = vec![0u8; AUDIO_CHUNK * 4];
            loop {
                let n = match read_full(&mut stdout, &mut bytes) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                let samples: Vec<f32> = bytes[..n - n % 4]
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect();
                if chunk_tx.send(samples).is_err() || n < bytes.len() {
                    break;
                }
            }
        });
        decoder.audio = Some(chunks);
    }

    Ok(decoder)
}
