use midly::{MetaMessage, Smf, Timing, TrackEventKind};

/// 120 BPM, used until the first tempo change.
const DEFAULT_US_PER_QUARTER: f64 = 500_000.0;

#[derive(Debug, Clone, Copy)]
struct TempoChange {
    tick: u64,
    us_per_quarter: f64,
    seconds: f64,
}

/// Converts absolute ticks into seconds.
///
/// Tempo changes are collected from every track of the file, so a format 1
/// file whose conductor track carries the tempo times all other tracks too.
#[derive(Debug, Clone)]
pub struct TempoMap {
    division: Division,
}

#[derive(Debug, Clone)]
enum Division {
    Metrical {
        ticks_per_quarter: f64,
        changes: Vec<TempoChange>,
    },
    Timecode {
        seconds_per_tick: f64,
    },
}

impl TempoMap {
    pub fn from_smf(smf: &Smf) -> Self {
        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) => tpq.as_int().max(1) as f64,
            Timing::Timecode(fps, subframes) => {
                let ticks_per_second = fps.as_f32() as f64 * subframes.max(1) as f64;
                return TempoMap {
                    division: Division::Timecode {
                        seconds_per_tick: 1.0 / ticks_per_second,
                    },
                };
            }
        };

        let mut raw: Vec<(u64, f64)> = Vec::new();
        for track in &smf.tracks {
            let mut tick: u64 = 0;
            for event in track {
                tick += event.delta.as_int() as u64;
                if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                    raw.push((tick, tempo.as_int() as f64));
                }
            }
        }
        raw.sort_by_key(|(tick, _)| *tick);

        let mut changes = vec![TempoChange {
            tick: 0,
            us_per_quarter: DEFAULT_US_PER_QUARTER,
            seconds: 0.0,
        }];
        for (tick, us_per_quarter) in raw {
            let seconds = seconds_between(changes[changes.len() - 1], tick, ticks_per_quarter);
            changes.push(TempoChange {
                tick,
                us_per_quarter,
                seconds,
            });
        }

        TempoMap {
            division: Division::Metrical {
                ticks_per_quarter,
                changes,
            },
        }
    }

    pub fn seconds_at(&self, tick: u64) -> f64 {
        match &self.division {
            Division::Timecode { seconds_per_tick } => tick as f64 * seconds_per_tick,
            Division::Metrical {
                ticks_per_quarter,
                changes,
            } => {
                let idx = changes.partition_point(|c| c.tick <= tick);
                // index 0 always sits at tick 0, so idx >= 1
                seconds_between(changes[idx - 1], tick, *ticks_per_quarter)
            }
        }
    }
}

fn seconds_between(from: TempoChange, tick: u64, ticks_per_quarter: f64) -> f64 {
    let ticks = tick.saturating_sub(from.tick) as f64;
    from.seconds + ticks / ticks_per_quarter * from.us_per_quarter / 1_000_000.0
}
