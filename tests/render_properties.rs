//! End-to-end checks of the chart geometry and render output through the
//! public API.

use candle_canvas::charts::{
    candle_width, price_step, ChartGeometry, DisplayList, DrawCommand, RasterSurface,
};
use candle_canvas::data::{BarSource, Direction, SimulatedFeed};
use candle_canvas::{ChartConfig, ChartRenderer, PriceBar};

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let mut open = closes.first().copied().unwrap_or(100.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let bar = PriceBar::new(
                format!("{i}"),
                open,
                open.max(close) + 1.5,
                open.min(close) - 1.5,
                close,
            );
            open = close;
            bar
        })
        .collect()
}

fn geometry(bars: &[PriceBar]) -> ChartGeometry {
    ChartGeometry::compute(800.0, 400.0, bars, &ChartConfig::default()).unwrap()
}

#[test]
fn first_and_last_bar_span_chart_width() {
    for n in [2, 3, 7, 30, 101] {
        let series = bars(&vec![100.0; n]);
        let geometry = geometry(&series);
        let times = geometry.times.unwrap();
        let area = geometry.area;
        assert_eq!(times.x(0, &area), area.left);
        assert_eq!(times.x(n - 1, &area), area.left + area.width);
    }
}

#[test]
fn price_extremes_fall_strictly_inside_chart() {
    let series = bars(&[120.0, 95.0, 140.0, 101.0, 133.0]);
    let geometry = geometry(&series);
    let prices = geometry.prices.unwrap();
    let area = geometry.area;

    let max = series.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let min = series.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let (y_max, y_min) = (prices.y(max, &area), prices.y(min, &area));

    assert!(y_max > area.top && y_max < area.bottom());
    assert!(y_min > area.top && y_min < area.bottom());
    assert!(y_max < y_min);

    // 10% of the range on each side, out of a total of 1.2x the range
    let margin = area.height / 12.0;
    assert!((y_max - area.top - margin).abs() < 1e-9);
    assert!((area.bottom() - y_min - margin).abs() < 1e-9);
}

#[test]
fn zero_padding_maps_extremes_to_edges() {
    let config = ChartConfig {
        price_padding_ratio: 0.0,
        ..ChartConfig::default()
    };
    let series = bars(&[10.0, 20.0]);
    let geometry = ChartGeometry::compute(800.0, 400.0, &series, &config).unwrap();
    let prices = geometry.prices.unwrap();
    let area = geometry.area;
    assert!((prices.y(prices.max, &area) - area.top).abs() < 1e-9);
    assert!((prices.y(prices.min, &area) - area.bottom()).abs() < 1e-9);
}

#[test]
fn tie_is_up_and_any_drop_is_down() {
    let tie = PriceBar::new("t", 100.0, 101.0, 99.0, 100.0);
    let drop = PriceBar::new("t", 100.0, 101.0, 99.0, 99.99);
    assert_eq!(tie.direction(), Direction::Up);
    assert_eq!(drop.direction(), Direction::Down);
}

#[test]
fn grid_step_tiers() {
    assert_eq!(price_step(150.0), 20.0);
    assert_eq!(price_step(75.0), 10.0);
    assert_eq!(price_step(30.0), 5.0);
}

#[test]
fn flat_series_renders_finite_coordinates() {
    let series: Vec<PriceBar> = (0..8)
        .map(|i| PriceBar::new(format!("{i}"), 100.0, 100.0, 100.0, 100.0))
        .collect();
    let mut list = DisplayList::new(800.0, 400.0, 1.0);
    ChartRenderer::default().render(&mut list, &series);

    assert!(list.is_finite());
    assert!(list
        .commands()
        .iter()
        .any(|c| matches!(c, DrawCommand::FillRect { .. })));
}

#[test]
fn flat_series_at_large_prices_renders_every_candle() {
    let series: Vec<PriceBar> = (0..5)
        .map(|i| PriceBar::new(format!("{i}"), 1e17, 1e17, 1e17, 1e17))
        .collect();
    let mut list = DisplayList::new(800.0, 400.0, 1.0);
    ChartRenderer::default().render(&mut list, &series);

    assert!(list.is_finite());
    let bodies = list
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
        .count();
    assert_eq!(bodies, 5);
}

#[test]
fn unvalidated_negative_padding_still_renders_finite() {
    let config = ChartConfig {
        price_padding_ratio: -0.5,
        ..ChartConfig::default()
    };
    let series = bars(&[100.0, 110.0, 95.0]);
    let mut list = DisplayList::new(800.0, 400.0, 1.0);
    ChartRenderer::new(config).render(&mut list, &series);

    assert!(list.is_finite());
    assert!(list
        .commands()
        .iter()
        .any(|c| matches!(c, DrawCommand::FillRect { .. })));
}

#[test]
fn single_bar_renders_frame() {
    let series = vec![PriceBar::new("9:00", 100.0, 105.0, 95.0, 102.0)];
    let mut list = DisplayList::new(800.0, 400.0, 1.0);
    ChartRenderer::default().render(&mut list, &series);

    assert!(list.is_finite());
    assert!(list
        .commands()
        .iter()
        .any(|c| matches!(c, DrawCommand::StrokeRect { .. })));
}

#[test]
fn rendering_twice_gives_identical_output() {
    let feed = SimulatedFeed::new(1548.75, 30, 7);
    let renderer = ChartRenderer::default();

    let mut first = DisplayList::new(640.0, 360.0, 2.0);
    renderer.render(&mut first, feed.bars());
    let mut second = first.clone();
    renderer.render(&mut second, feed.bars());
    assert_eq!(first, second);

    let mut a = RasterSurface::new(320.0, 200.0, 1.0);
    let mut b = RasterSurface::new(320.0, 200.0, 1.0);
    renderer.render(&mut a, feed.bars());
    renderer.render(&mut b, feed.bars());
    renderer.render(&mut b, feed.bars());
    assert_eq!(a.image().as_raw(), b.image().as_raw());
}

#[test]
fn replayed_recording_matches_direct_raster() {
    let feed = SimulatedFeed::new(812.3, 30, 11);
    let renderer = ChartRenderer::default();

    let mut direct = RasterSurface::new(480.0, 270.0, 1.5);
    renderer.render(&mut direct, feed.bars());

    let mut frame = DisplayList::new(480.0, 270.0, 1.5);
    renderer.render(&mut frame, feed.bars());
    assert!(frame.is_finite());
    let mut replayed = RasterSurface::new(480.0, 270.0, 1.5);
    frame.replay(&mut replayed);

    assert_eq!(direct.image().as_raw(), replayed.image().as_raw());
}

#[test]
fn candles_leave_a_gap() {
    for n in [1, 2, 10, 500] {
        let slot = 690.0 / n as f64;
        let width = candle_width(690.0, n, 0.8);
        assert!(width < slot);
        assert!((width - slot * 0.8).abs() < 1e-12);
    }
}

#[test]
fn live_feed_keeps_window_length() {
    let mut feed = SimulatedFeed::new(3245.6, 30, 1);
    for _ in 0..45 {
        assert!(feed.advance());
    }
    assert_eq!(feed.bars().len(), 30);

    let mut list = DisplayList::new(800.0, 400.0, 1.0);
    ChartRenderer::default().render(&mut list, feed.bars());
    assert!(list.is_finite());
    let bodies = list
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
        .count();
    assert_eq!(bodies, 30);
}
