//! Hand-assembled Standard MIDI Files for tests.

pub struct TrackBuilder {
    data: Vec<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn tempo(mut self, delta: u32, us_per_quarter: u32) -> Self {
        write_vlq(&mut self.data, delta);
        self.data.extend_from_slice(&[0xFF, 0x51, 0x03]);
        self.data.extend_from_slice(&us_per_quarter.to_be_bytes()[1..]);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        write_vlq(&mut self.data, 0);
        self.data.extend_from_slice(&[0xFF, 0x03]);
        write_vlq(&mut self.data, name.len() as u32);
        self.data.extend_from_slice(name.as_bytes());
        self
    }

    pub fn note_on(mut self, delta: u32, key: u8, vel: u8) -> Self {
        write_vlq(&mut self.data, delta);
        self.data.extend_from_slice(&[0x90, key, vel]);
        self
    }

    pub fn note_off(mut self, delta: u32, key: u8) -> Self {
        write_vlq(&mut self.data, delta);
        self.data.extend_from_slice(&[0x80, key, 0]);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.data.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        self.data
    }
}

/// Wraps track bodies into a format 0 or 1 file with the given division.
pub fn smf_bytes(ticks_per_quarter: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let format: u16 = if tracks.len() == 1 { 0 } else { 1 };
    let mut out = Vec::new();
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&format.to_be_bytes());
    out.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    out.extend_from_slice(&ticks_per_quarter.to_be_bytes());
    for track in tracks {
        out.extend_from_slice(b"MTrk");
        out.extend_from_slice(&(track.len() as u32).to_be_bytes());
        out.extend_from_slice(track);
    }
    out
}

/// One track at 120 BPM / 480 ticks per quarter: C4 at 0.0s and D4 at 0.5s,
/// both lasting 0.25s.
pub fn two_note_song() -> Vec<u8> {
    let track = TrackBuilder::new()
        .tempo(0, 500_000)
        .note_on(0, 60, 100)
        .note_off(240, 60)
        .note_on(240, 62, 100)
        .note_off(240, 62)
        .finish();
    smf_bytes(480, &[track])
}

fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    let mut buf = [0u8; 4];
    let mut len = 0;
    loop {
        buf[len] = (value & 0x7F) as u8;
        len += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(buf[i] | continuation);
    }
}
