use crate::types::{Direction, ExitReason, Trade};

/// Single-position long/short bookkeeping for one simulated strategy run.
pub struct Portfolio {
    pub initial_capital: f64,
    pub cash: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    commission: f64,
    realized_pnl: f64,
    unrealized_pnl: f64,
    peak_equity: f64,
    max_drawdown: f64,
}

pub struct Position {
    pub direction: Direction,
    pub entry_bar: usize,
    pub entry_price: f64,
    pub size: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64, commission: f64) -> Self {
        Self {
            initial_capital,
            cash: initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: vec![initial_capital],
            commission,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            peak_equity: initial_capital,
            max_drawdown: 0.0,
        }
    }

    /// Advance one bar: open on a fresh signal, exit on reversal or stop,
    /// then mark to market.
    pub fn process_bar(
        &mut self,
        bar: usize,
        signal: f64,
        price: f64,
        size_fraction: f64,
        stop_loss_pct: f64,
    ) {
        if self.position.is_none() && signal != 0.0 {
            self.open_position(bar, signal, price, size_fraction);
        } else if self.position.is_some() {
            self.check_exit(bar, signal, price, stop_loss_pct);
        }

        self.mark_to_market(price);
        self.update_drawdown();
        self.equity_curve.push(self.equity());
    }

    fn open_position(&mut self, bar: usize, signal: f64, price: f64, size_fraction: f64) {
        if price <= 0.0 {
            return;
        }
        let direction = if signal > 0.0 {
            Direction::Long
        } else {
            Direction::Short
        };
        let notional = self.cash * size_fraction;
        let size = notional / price;
        self.cash -= notional * self.commission;

        match direction {
            Direction::Long => self.cash -= size * price,
            Direction::Short => self.cash += size * price,
        }

        self.position = Some(Position {
            direction,
            entry_bar: bar,
            entry_price: price,
            size,
        });
    }

    fn check_exit(&mut self, bar: usize, signal: f64, price: f64, stop_loss_pct: f64) {
        let (direction, entry_price) = match &self.position {
            Some(pos) => (pos.direction, pos.entry_price),
            None => return,
        };

        let adverse_move = match direction {
            Direction::Long => (entry_price - price) / entry_price,
            Direction::Short => (price - entry_price) / entry_price,
        };
        if adverse_move >= stop_loss_pct {
            self.close_position(bar, price, ExitReason::StopLoss);
            return;
        }

        let reversal = match direction {
            Direction::Long => signal < 0.0,
            Direction::Short => signal > 0.0,
        };
        if reversal {
            self.close_position(bar, price, ExitReason::Signal);
        }
    }

    pub fn close_position(&mut self, bar: usize, price: f64, reason: ExitReason) {
        if let Some(pos) = self.position.take() {
            let gross = match pos.direction {
                Direction::Long => (price - pos.entry_price) * pos.size,
                Direction::Short => (pos.entry_price - price) * pos.size,
            };
            let fees = price * pos.size * self.commission;
            let profit = gross - fees;

            match pos.direction {
                Direction::Long => self.cash += price * pos.size,
                Direction::Short => self.cash -= price * pos.size,
            }
            self.cash -= fees;
            self.realized_pnl += profit;
            self.unrealized_pnl = 0.0;

            self.trades.push(Trade {
                entry_bar: pos.entry_bar,
                exit_bar: bar,
                entry_price: pos.entry_price,
                exit_price: price,
                direction: pos.direction,
                size: pos.size,
                profit,
                exit_reason: reason,
            });
        }
    }

    fn mark_to_market(&mut self, price: f64) {
        if let Some(pos) = &self.position {
            self.unrealized_pnl = match pos.direction {
                Direction::Long => (price - pos.entry_price) * pos.size,
                Direction::Short => (pos.entry_price - price) * pos.size,
            };
        } else {
            self.unrealized_pnl = 0.0;
        }
    }

    fn update_drawdown(&mut self) {
        let equity = self.equity();
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        if self.peak_equity > 0.0 {
            let dd = (self.peak_equity - equity) / self.peak_equity * 100.0;
            if dd > self.max_drawdown {
                self.max_drawdown = dd;
            }
        }
    }

    pub fn equity(&self) -> f64 {
        match &self.position {
            Some(pos) => match pos.direction {
                Direction::Long => self.cash + pos.size * pos.entry_price + self.unrealized_pnl,
                Direction::Short => self.cash - pos.size * pos.entry_price + self.unrealized_pnl,
            },
            None => self.cash,
        }
    }

    pub fn get_trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn get_equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_round_trip_books_profit() {
        let mut portfolio = Portfolio::new(10000.0, 0.0);
        portfolio.process_bar(0, 1.0, 100.0, 0.1, 1.0);
        portfolio.process_bar(1, 0.0, 105.0, 0.1, 1.0);
        portfolio.process_bar(2, -1.0, 110.0, 0.1, 1.0);

        assert_eq!(portfolio.get_trades().len(), 1);
        let trade = &portfolio.get_trades()[0];
        assert_eq!(trade.direction, Direction::Long);
        assert!(trade.profit > 0.0);
        assert_eq!(trade.exit_reason, ExitReason::Signal);
    }

    #[test]
    fn test_stop_loss_triggers() {
        let mut portfolio = Portfolio::new(10000.0, 0.0);
        portfolio.process_bar(0, 1.0, 100.0, 0.1, 0.05);
        // 10% adverse move, stop at 5%
        portfolio.process_bar(1, 1.0, 90.0, 0.1, 0.05);

        assert_eq!(portfolio.get_trades().len(), 1);
        assert_eq!(portfolio.get_trades()[0].exit_reason, ExitReason::StopLoss);
        assert!(portfolio.get_trades()[0].profit < 0.0);
    }

    #[test]
    fn test_constant_signal_holds_position() {
        let mut portfolio = Portfolio::new(10000.0, 0.0);
        for (bar, price) in [100.0, 101.0, 102.0, 103.0].iter().enumerate() {
            portfolio.process_bar(bar, 1.0, *price, 0.1, 1.0);
        }

        // Position opens but never closes
        assert_eq!(portfolio.get_trades().len(), 0);
        assert!(portfolio.position.is_some());
        assert_eq!(portfolio.get_equity_curve().len(), 5);
    }
}
