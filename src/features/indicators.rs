//! Technical indicators derived from OHLCV bars
//!
//! Each function returns one value per input bar; positions inside the
//! warm-up window are NaN so the fill step can treat them like any other gap.

use crate::types::{FeatureRow, PriceRow};

pub const SMA_SHORT: usize = 20;
pub const SMA_LONG: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;

/// Simple moving average
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = sum / period as f64;
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = sum / period as f64;
    }
    out
}

/// Exponential moving average seeded with the SMA of the first `period` values
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let Some(start) = values.iter().position(|v| v.is_finite()) else {
        return out;
    };
    if period == 0 || values.len() < start + period {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut current = values[start..start + period].iter().sum::<f64>() / period as f64;
    out[start + period - 1] = current;

    for i in (start + period)..values.len() {
        current = (values[i] - current) * multiplier + current;
        out[i] = current;
    }
    out
}

/// Wilder's RSI
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }
    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;
    out[period] = rsi_from_averages(avg_gain, avg_loss);

    for i in (period + 1)..closes.len() {
        let change = closes[i] - closes[i - 1];
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
        out[i] = rsi_from_averages(avg_gain, avg_loss);
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// MACD line (EMA12 - EMA26) and histogram (MACD - EMA9 of MACD)
pub fn macd(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let fast = ema(closes, 12);
    let slow = ema(closes, 26);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, 9);
    let hist = line.iter().zip(&signal).map(|(m, s)| m - s).collect();
    (line, hist)
}

/// Average directional index with Wilder smoothing
pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < 2 * period + 1 || highs.len() != n || lows.len() != n {
        return out;
    }

    let mut tr = vec![0.0; n];
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up = highs[i] - highs[i - 1];
        let down = lows[i - 1] - lows[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
        tr[i] = (highs[i] - lows[i])
            .max((highs[i] - closes[i - 1]).abs())
            .max((lows[i] - closes[i - 1]).abs());
    }

    let mut tr_s: f64 = tr[1..=period].iter().sum();
    let mut plus_s: f64 = plus_dm[1..=period].iter().sum();
    let mut minus_s: f64 = minus_dm[1..=period].iter().sum();

    let mut dx = vec![f64::NAN; n];
    dx[period] = directional_index(plus_s, minus_s, tr_s);
    for i in (period + 1)..n {
        tr_s = tr_s - tr_s / period as f64 + tr[i];
        plus_s = plus_s - plus_s / period as f64 + plus_dm[i];
        minus_s = minus_s - minus_s / period as f64 + minus_dm[i];
        dx[i] = directional_index(plus_s, minus_s, tr_s);
    }

    let first = 2 * period - 1;
    let mut current = dx[period..=first].iter().sum::<f64>() / period as f64;
    out[first] = current;
    for i in (first + 1)..n {
        current = (current * (period as f64 - 1.0) + dx[i]) / period as f64;
        out[i] = current;
    }
    out
}

fn directional_index(plus: f64, minus: f64, tr: f64) -> f64 {
    if tr == 0.0 {
        return 0.0;
    }
    let plus_di = plus / tr * 100.0;
    let minus_di = minus / tr * 100.0;
    let sum = plus_di + minus_di;
    if sum == 0.0 {
        return 0.0;
    }
    (plus_di - minus_di).abs() / sum * 100.0
}

/// On-balance volume, starting from zero
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    let mut running = 0.0;
    for i in 0..closes.len() {
        if i > 0 {
            let volume = volumes.get(i).copied().unwrap_or(0.0);
            if closes[i] > closes[i - 1] {
                running += volume;
            } else if closes[i] < closes[i - 1] {
                running -= volume;
            }
        }
        out.push(running);
    }
    out
}

/// Derive one feature row per bar; the last row has no target
pub fn build_feature_rows(bars: &[PriceRow]) -> Vec<FeatureRow> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let sma_short = sma(&closes, SMA_SHORT);
    let sma_long = sma(&closes, SMA_LONG);
    let rsi_values = rsi(&closes, RSI_PERIOD);
    let (macd_line, macd_hist) = macd(&closes);
    let adx_values = adx(&highs, &lows, &closes, ADX_PERIOD);
    let obv_values = obv(&closes, &volumes);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let crossover = if sma_short[i].is_nan() || sma_long[i].is_nan() {
                f64::NAN
            } else if sma_short[i] > sma_long[i] {
                1.0
            } else {
                0.0
            };
            let ratio = if sma_short[i].is_nan() || sma_short[i] == 0.0 {
                f64::NAN
            } else {
                bar.close / sma_short[i] * 100.0
            };
            let target = closes
                .get(i + 1)
                .map(|next| u8::from(*next > bar.close));

            FeatureRow {
                date: bar.date,
                sma_crossover: crossover,
                price_sma_ratio: ratio,
                rsi: rsi_values[i],
                macd: macd_line[i],
                macd_hist: macd_hist[i],
                adx: adx_values[i],
                obv: obv_values[i],
                target,
            }
        })
        .collect()
}
