//! A headless racer: joins a lobby, drafts two powerups, and types the
//! race at a set speed with the occasional corrected typo.
//!
//! ```text
//! autotyper [--url ws://127.0.0.1:8080/ws] [--name bot] [--wpm 60]
//!           [--typo-rate 0.03] [--strategy first|last|closest] [--skip-wait]
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};
use typerace::prelude::*;

/// Characters per "word" in the usual WPM convention.
const CHARS_PER_WORD: f64 = 5.0;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

struct Options {
    url: String,
    name: String,
    wpm: f64,
    typo_rate: f64,
    strategy: Strategy,
    skip_wait: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            url: typerace::DEFAULT_URL.to_string(),
            name: "autotyper".to_string(),
            wpm: 60.0,
            typo_rate: 0.03,
            strategy: Strategy::First,
            skip_wait: false,
        }
    }
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--url" => opts.url = value()?,
            "--name" => opts.name = value()?,
            "--wpm" => {
                opts.wpm = value()?.parse().map_err(|e| format!("--wpm: {e}"))?;
                if opts.wpm <= 0.0 {
                    return Err("--wpm must be positive".into());
                }
            }
            "--typo-rate" => {
                opts.typo_rate = value()?.parse().map_err(|e| format!("--typo-rate: {e}"))?;
                if !(0.0..=1.0).contains(&opts.typo_rate) {
                    return Err("--typo-rate must be between 0 and 1".into());
                }
            }
            "--strategy" => {
                opts.strategy = value()?.parse().map_err(|e: UnknownStrategy| e.to_string())?;
            }
            "--skip-wait" => opts.skip_wait = true,
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(opts)
}

// ---------------------------------------------------------------------------
// Typing model
// ---------------------------------------------------------------------------

/// Input-buffer states for typing `word`, one per keystroke.
///
/// A wrong key is followed by a backspace before the right one.
fn keystrokes(word: &str, trailing_space: bool, typo_rate: f64, rng: &mut impl Rng) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    for c in word.chars() {
        if rng.random_bool(typo_rate) {
            out.push(format!("{buf}{}", wrong_key(c, rng)));
            out.push(buf.clone());
        }
        buf.push(c);
        out.push(buf.clone());
    }
    if trailing_space {
        buf.push(' ');
        out.push(buf);
    }
    out
}

fn wrong_key(intended: char, rng: &mut impl Rng) -> char {
    loop {
        let c = char::from(b'a' + rng.random_range(0..26u8));
        if c != intended {
            return c;
        }
    }
}

/// Two distinct powerups from the pool, chosen at random.
fn draft(pool: &[PowerupId]) -> Vec<PowerupId> {
    let mut rng = rand::rng();
    let mut remaining = pool.to_vec();
    let mut picks = Vec::new();
    while picks.len() < 2 && !remaining.is_empty() {
        let pick = remaining.swap_remove(rng.random_range(0..remaining.len()));
        if !picks.contains(&pick) {
            picks.push(pick);
        }
    }
    picks
}

// ---------------------------------------------------------------------------
// Race
// ---------------------------------------------------------------------------

async fn race(
    handle: &ClientHandle,
    opts: &Options,
    mut powerup: Option<PowerupId>,
) -> Result<(), TypeRaceError> {
    let key_delay = Duration::from_secs_f64(60.0 / (opts.wpm * CHARS_PER_WORD));
    let line = MeasuredLine {
        caret_x: 0.0,
        container_width: f32::MAX,
        char_width: 1.0,
    };

    loop {
        let snap = handle.snapshot();
        if snap.phase != Phase::Game {
            break;
        }
        let index = snap.current_word_index;
        let Some(word) = snap.words.get(index) else {
            break;
        };
        let is_last = index + 1 == snap.words.len();

        let strokes = {
            let mut rng = rand::rng();
            keystrokes(&word.text, !is_last, opts.typo_rate, &mut rng)
        };
        for value in strokes {
            if let InputOutcome::Rejected(reason) = handle.input(&value, line).await? {
                debug!(?reason, word = index, "keystroke rejected");
            }
            tokio::time::sleep(key_delay).await;
        }

        if index * 2 >= snap.words.len() {
            if let Some(p) = powerup.take() {
                info!(powerup = %p, strategy = %opts.strategy, "using powerup");
                handle.purchase(p).await?;
            }
        }
    }
    Ok(())
}

fn print_standings(snapshot: &GameSnapshot) {
    println!("{:<6} {:<20} {:>6} {:>6}", "place", "name", "words", "wpm");
    for player in snapshot.standings() {
        let place = player.place.map_or_else(|| "-".to_string(), |p| p.to_string());
        println!(
            "{:<6} {:<20} {:>6} {:>6.0}",
            place, player.name, player.progress, player.wpm
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    typerace::init_tracing();
    let opts = parse_args()?;

    let handle = TypeRaceClient::builder()
        .url(&opts.url)
        .name(&opts.name)
        .default_strategy(opts.strategy)
        .build()?
        .connect()
        .await?;

    let lobby = handle.wait_for(|s| s.phase != Phase::Login).await?;
    info!(
        players = lobby.players.len(),
        words = lobby.words.len(),
        time_left = lobby.time_left,
        "in lobby"
    );

    let picks = draft(&lobby.draft_pool);
    for p in &picks {
        handle.select_powerup(*p).await?;
    }
    if opts.skip_wait {
        handle.skip_wait().await?;
    }

    handle.wait_for(|s| s.phase == Phase::Game).await?;
    race(&handle, &opts, picks.first().copied()).await?;

    let done = handle
        .wait_for(|s| s.own_player().is_some_and(|p| p.finished) || s.phase == Phase::Login)
        .await?;
    print_standings(&done);

    let _ = handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_keystrokes_without_typos_are_prefixes() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            keystrokes("cat", true, 0.0, &mut rng),
            vec!["c", "ca", "cat", "cat "]
        );
        assert_eq!(keystrokes("cat", false, 0.0, &mut rng), vec!["c", "ca", "cat"]);
    }

    #[test]
    fn test_typos_are_backspaced() {
        let mut rng = StdRng::seed_from_u64(7);
        let strokes = keystrokes("ab", true, 1.0, &mut rng);
        assert_eq!(strokes.len(), 2 * 3 + 1);
        assert_eq!(strokes[1], "");
        assert_eq!(strokes[2], "a");
        assert_eq!(strokes[4], "a");
        assert_eq!(strokes.last().map(String::as_str), Some("ab "));
        assert_ne!(strokes[0], "a");
    }

    #[test]
    fn test_draft_picks_two_distinct_from_pool() {
        let pool = [PowerupId::Fog, PowerupId::Fog, PowerupId::Scrambler];
        let picks = draft(&pool);
        assert_eq!(picks.len(), 2);
        assert_ne!(picks[0], picks[1]);
        assert!(picks.iter().all(|p| pool.contains(p)));
    }
}
