use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use hearth_core::{DayBucket, Hearth, TimeSpec, View};

#[derive(Subcommand)]
pub enum ViewArgs {
    /// Rolling three-day view starting today
    Timeline,
    /// Week grid (Sunday-first)
    Week {
        /// Weeks to page forward (negative for back)
        #[arg(short, long, default_value_t = 0)]
        offset: i64,
    },
    /// Full month grid
    Month {
        /// Any date inside the month to show (YYYY-MM-DD, default today)
        #[arg(short, long)]
        anchor: Option<String>,
    },
}

pub fn run(hearth: &Hearth, args: &ViewArgs) -> Result<()> {
    let today = Local::now().date_naive();
    let view = match args {
        ViewArgs::Timeline => View::Timeline,
        ViewArgs::Week { offset } => View::Week { offset: *offset },
        ViewArgs::Month { anchor } => {
            let anchor = match anchor {
                Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| anyhow::anyhow!("invalid date '{s}', expected YYYY-MM-DD"))?,
                None => today,
            };
            View::Month { anchor }
        }
    };

    let projection = hearth.get_projection(view, today)?;
    for bucket in &projection.buckets {
        print_bucket(bucket, today);
    }
    Ok(())
}

fn print_bucket(bucket: &DayBucket, today: NaiveDate) {
    let mut header = bucket.date.format("%a %Y-%m-%d").to_string();
    if bucket.date == today {
        header.push_str("  <- today");
    }
    if bucket.outside_current_month {
        header.push_str("  (adjacent month)");
    }
    println!("{header}");

    if bucket.events.is_empty() {
        println!("    -");
        return;
    }
    for event in &bucket.events {
        let when = match &event.time_spec {
            TimeSpec::AllDay => "all day".to_string(),
            TimeSpec::MultiDay { span_days } => {
                let day = (bucket.date - event.date).num_days() + 1;
                format!("day {day}/{span_days}")
            }
            TimeSpec::Timed { start, end } => match end {
                Some(end) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
                None => start.format("%H:%M").to_string(),
            },
        };
        println!("    [{when}] {}", event.title);
    }
}
