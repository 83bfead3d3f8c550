use std::fmt::{self, Write};

use weatherpanel_core::{
    ViewBody, ViewModel,
    view::{ForecastCard, SnapshotView},
};

/// Numbers as the provider sent them, but whole values keep one decimal.
fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn degrees(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{} °", number(v)))
}

pub fn render_text(view: &ViewModel) -> Result<String, fmt::Error> {
    let mut out = String::new();

    match &view.body {
        ViewBody::Loading => {
            out.push_str("Loading...\n");
            return Ok(out);
        }
        ViewBody::Empty => {
            out.push_str("No Data Found !!!!\nPlease choose a city\n");
        }
        ViewBody::Snapshot(snapshot) => render_snapshot(&mut out, snapshot)?,
    }

    if let Some(cards) = &view.forecast {
        out.push_str("\nForecast\n");
        for card in cards {
            render_card(&mut out, card)?;
        }
    }

    Ok(out)
}

fn render_snapshot(out: &mut String, s: &SnapshotView) -> fmt::Result {
    writeln!(out, "{}\n{}\n", s.title, s.date)?;
    writeln!(out, "{}  {}", degrees(Some(s.temperature)), s.description)?;
    writeln!(out, "  ({})\n", s.icon_url)?;
    writeln!(
        out,
        "High      {:<12} Wind      {:<12} Sunrise   {}",
        degrees(Some(s.high)),
        format!("{} m/s", number(s.wind_speed)),
        s.sunrise
    )?;
    writeln!(
        out,
        "Low       {:<12} Humidity  {:<12} Sunset    {}",
        degrees(Some(s.low)),
        format!("{} %", s.humidity),
        s.sunset
    )
}

fn render_card(out: &mut String, card: &ForecastCard) -> fmt::Result {
    writeln!(
        out,
        "  {}  {:<24} {} / {}",
        card.timestamp_text,
        card.description,
        degrees(card.high),
        degrees(card.low)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherpanel_core::{
        CountryEntry, FetchPolicy, ForecastEntry, PanelEvent, WeatherPanel, WeatherSnapshot,
    };

    fn lagos() -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: "Lagos".into(),
            country_code: "NG".into(),
            timestamp_seconds: 1_700_000_000,
            temperature: 301.2,
            temp_min: 299.0,
            temp_max: 303.5,
            humidity: 78,
            wind_speed: 4.1,
            sunrise_seconds: 1_699_941_600,
            sunset_seconds: 1_699_984_800,
            condition_icon: "03d".into(),
            condition_description: "scattered clouds".into(),
        }
    }

    fn forecast(n: usize) -> Vec<ForecastEntry> {
        (0..n)
            .map(|i| ForecastEntry {
                timestamp_text: format!("2023-11-15 {:02}:00:00", i * 3),
                condition_icon: "10d".into(),
                condition_description: format!("light rain {i}"),
            })
            .collect()
    }

    fn panel_with(snapshot: Option<WeatherSnapshot>, entries: usize) -> WeatherPanel {
        let mut panel = WeatherPanel::new(FetchPolicy::LatestRequest);
        panel.mount();
        panel.apply(PanelEvent::CountriesLoaded(Ok(vec![CountryEntry {
            country: "Nigeria".into(),
            iso2: "NG".into(),
            cities: vec!["Lagos".into()],
        }])));
        panel.on_country_change("Nigeria").expect("known country");
        panel.on_city_change("Lagos").expect("enabled");

        let current = snapshot.ok_or_else(|| anyhow::anyhow!("offline"));
        panel.apply(PanelEvent::CurrentLoaded {
            seq: 0,
            result: current,
        });
        panel.apply(PanelEvent::ForecastLoaded {
            seq: 0,
            result: Ok(forecast(entries)),
        });
        panel
    }

    #[test]
    fn number_keeps_one_decimal_for_whole_values() {
        assert_eq!(number(299.0), "299.0");
        assert_eq!(number(301.15), "301.15");
    }

    #[test]
    fn renders_snapshot_with_high_low() {
        let panel = panel_with(Some(lagos()), 0);
        let text = render_text(&ViewModel::derive(&panel, &chrono::Utc)).expect("render");

        assert!(text.starts_with("Lagos, NG\nTuesday, November 14\n"));
        assert!(text.contains("301.2 °  scattered clouds"));
        assert!(text.contains("High      303.5 °"));
        assert!(text.contains("Low       299.0 °"));
        assert!(text.contains("4.1 m/s"));
        assert!(text.contains("78 %"));
        assert!(text.contains("Sunrise   6:00:00 AM"));
        assert!(!text.contains("Forecast"));
    }

    #[test]
    fn renders_forecast_cards_with_current_high_low() {
        let panel = panel_with(Some(lagos()), 7);
        let text = render_text(&ViewModel::derive(&panel, &chrono::Utc)).expect("render");

        let cards: Vec<_> = text
            .lines()
            .skip_while(|l| *l != "Forecast")
            .skip(1)
            .collect();
        assert_eq!(cards.len(), 7);
        assert!(cards.iter().all(|l| l.ends_with("303.5 ° / 299.0 °")));
    }

    #[test]
    fn renders_empty_state() {
        let panel = panel_with(None, 0);
        let text = render_text(&ViewModel::derive(&panel, &chrono::Utc)).expect("render");
        assert_eq!(text, "No Data Found !!!!\nPlease choose a city\n");
    }

    #[test]
    fn loading_hides_everything_else() {
        let mut panel = panel_with(Some(lagos()), 3);
        panel.on_city_change("Lagos").expect("enabled");

        let text = render_text(&ViewModel::derive(&panel, &chrono::Utc)).expect("render");
        assert_eq!(text, "Loading...\n");
    }
}
