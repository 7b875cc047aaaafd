//! Rule DSL parser.
//!
//! Recursive descent parser for scoring conditions. Converts text to AST with
//! meaningful error messages including character offset, expected/found tokens.
//!
//! ```text
//! rule    := ABOVE(op, op) | BELOW(op, op) | EQUALS(op, op)
//!          | BETWEEN(op, num, num) | AND(rule, rule, ...) | OR(rule, rule, ...)
//!          | NOT(rule) | SQUEEZE
//! op      := number | open | high | low | close | volume
//!          | SMA(20|50|200) | RSI(14) | ATR(14) | MACD_LINE | MACD_SIGNAL
//!          | BOLLINGER_UPPER | BOLLINGER_LOWER | BOLLINGER_WIDTH
//!          | KELTNER_UPPER | KELTNER_LOWER
//! ```

use crate::domain::error::ParseError;
use crate::domain::indicator::frame::FrameField;
use crate::domain::rule::{Operand, Rule};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            position: self.pos,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        remaining.starts_with(keyword)
            && !remaining[keyword.len()..]
                .chars()
                .next()
                .map(|c| c.is_alphanumeric() || c == '_')
                .unwrap_or(false)
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            let found = self.peek_word();
            Err(self.error(format!("expected '{}', found '{}'", keyword, found)))
        }
    }

    fn peek_word(&self) -> String {
        let word: String = self
            .remaining()
            .chars()
            .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
            .collect();
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_integer(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }

        let num_str = &self.input[start..self.pos];
        if num_str.is_empty() {
            return Err(ParseError {
                message: "expected integer".to_string(),
                position: start,
            });
        }
        num_str.parse::<usize>().map_err(|_| ParseError {
            message: format!("invalid integer: {}", num_str),
            position: start,
        })
    }

    /// `NAME(period)` where only the periods the frame computes are accepted.
    fn parse_period(&mut self, name: &str, allowed: &[usize]) -> Result<usize, ParseError> {
        self.expect_char('(')?;
        let start = self.pos;
        let period = self.parse_integer()?;
        if !allowed.contains(&period) {
            let allowed: Vec<String> = allowed.iter().map(|p| p.to_string()).collect();
            return Err(ParseError {
                message: format!(
                    "{} period must be one of {}, found {}",
                    name,
                    allowed.join(", "),
                    period
                ),
                position: start,
            });
        }
        self.expect_char(')')?;
        Ok(period)
    }

    fn parse_field(&mut self) -> Result<FrameField, ParseError> {
        self.skip_whitespace();

        const PLAIN: [(&str, FrameField); 12] = [
            ("open", FrameField::Open),
            ("high", FrameField::High),
            ("low", FrameField::Low),
            ("close", FrameField::Close),
            ("volume", FrameField::Volume),
            ("MACD_LINE", FrameField::MacdLine),
            ("MACD_SIGNAL", FrameField::MacdSignal),
            ("BOLLINGER_UPPER", FrameField::BollingerUpper),
            ("BOLLINGER_LOWER", FrameField::BollingerLower),
            ("BOLLINGER_WIDTH", FrameField::BollingerWidth),
            ("KELTNER_UPPER", FrameField::KeltnerUpper),
            ("KELTNER_LOWER", FrameField::KeltnerLower),
        ];
        for (keyword, field) in PLAIN {
            if self.consume_keyword(keyword) {
                return Ok(field);
            }
        }

        if self.consume_keyword("SMA") {
            return match self.parse_period("SMA", &[20, 50, 200])? {
                20 => Ok(FrameField::Sma20),
                50 => Ok(FrameField::Sma50),
                _ => Ok(FrameField::Sma200),
            };
        }
        if self.consume_keyword("RSI") {
            self.parse_period("RSI", &[14])?;
            return Ok(FrameField::Rsi);
        }
        if self.consume_keyword("ATR") {
            self.parse_period("ATR", &[14])?;
            return Ok(FrameField::Atr);
        }

        let word = self.peek_word();
        Err(self.error(format!("expected price field or indicator, found '{}'", word)))
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();

        if self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == '-' || ch == '.')
        {
            return Ok(Operand::Constant(self.parse_number()?));
        }

        Ok(Operand::Field(self.parse_field()?))
    }

    fn parse_comparison(&mut self, keyword: &str) -> Result<Rule, ParseError> {
        self.expect_keyword(keyword)?;
        self.expect_char('(')?;

        let left = self.parse_operand()?;
        self.expect_char(',')?;
        let right = self.parse_operand()?;
        self.expect_char(')')?;

        match keyword {
            "ABOVE" => Ok(Rule::Above { left, right }),
            "BELOW" => Ok(Rule::Below { left, right }),
            _ => Ok(Rule::Equals { left, right }),
        }
    }

    fn parse_between(&mut self) -> Result<Rule, ParseError> {
        self.expect_keyword("BETWEEN")?;
        self.expect_char('(')?;

        let operand = self.parse_operand()?;
        self.expect_char(',')?;
        let lower = self.parse_number()?;
        self.expect_char(',')?;
        let upper_pos = self.pos;
        let upper = self.parse_number()?;
        self.expect_char(')')?;

        if lower > upper {
            return Err(ParseError {
                message: format!("BETWEEN lower bound {} exceeds upper bound {}", lower, upper),
                position: upper_pos,
            });
        }

        Ok(Rule::Between {
            operand,
            lower,
            upper,
        })
    }

    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        self.skip_whitespace();

        for keyword in ["ABOVE", "BELOW", "EQUALS"] {
            if self.peek_keyword(keyword) {
                return self.parse_comparison(keyword);
            }
        }
        if self.peek_keyword("BETWEEN") {
            return self.parse_between();
        }
        if self.peek_keyword("AND") {
            return Ok(Rule::And(self.parse_list("AND")?));
        }
        if self.peek_keyword("OR") {
            return Ok(Rule::Or(self.parse_list("OR")?));
        }
        if self.peek_keyword("NOT") {
            return self.parse_not();
        }
        if self.consume_keyword("SQUEEZE") {
            return Ok(Rule::Squeeze);
        }

        let word = self.peek_word();
        Err(self.error(format!("expected rule, found '{}'", word)))
    }

    fn parse_list(&mut self, keyword: &str) -> Result<Vec<Rule>, ParseError> {
        self.expect_keyword(keyword)?;
        self.expect_char('(')?;

        let mut rules = vec![self.parse_rule()?];

        loop {
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.advance();
                break;
            }
            self.expect_char(',')?;
            rules.push(self.parse_rule()?);
        }

        if rules.len() < 2 {
            return Err(self.error(format!("{} requires at least 2 rules", keyword)));
        }

        Ok(rules)
    }

    fn parse_not(&mut self) -> Result<Rule, ParseError> {
        self.expect_keyword("NOT")?;
        self.expect_char('(')?;
        let rule = self.parse_rule()?;
        self.expect_char(')')?;
        Ok(Rule::Not(Box::new(rule)))
    }

    fn parse(&mut self) -> Result<Rule, ParseError> {
        let rule = self.parse_rule()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!(
                "unexpected input after rule: '{}'",
                self.remaining()
            )));
        }
        Ok(rule)
    }
}

pub fn parse(input: &str) -> Result<Rule, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
