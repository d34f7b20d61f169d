//! Amounts in words, Indian numbering (crore, lakh, thousand).

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use super::round_amount;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven", "Twelve", "Thirteen",
    "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = ["", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety"];

const CRORE: u64 = 1_00_00_000;
const LAKH: u64 = 1_00_000;

pub fn amount_in_words(amount: Decimal) -> String {
    let amount = round_amount(amount);
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let amount = amount.abs();

    let (Some(rupees), Some(paise)) = (amount.trunc().to_u64(), (amount.fract() * Decimal::ONE_HUNDRED).to_u64()) else {
        return format!("{amount} Rupees Only");
    };

    if rupees == 0 && paise == 0 {
        return "Zero Rupees Only".to_owned();
    }

    let mut words = Vec::new();

    if negative {
        words.push("Minus");
    }

    if rupees > 0 {
        spell(rupees, &mut words);
        words.push("Rupees");
    }

    if paise > 0 {
        if rupees > 0 {
            words.push("and");
        }
        spell(paise, &mut words);
        words.push("Paise");
    }

    words.push("Only");
    words.join(" ")
}

fn spell(mut n: u64, words: &mut Vec<&'static str>) {
    if n >= CRORE {
        spell(n / CRORE, words);
        words.push("Crore");
        n %= CRORE;
    }

    if n >= LAKH {
        below_hundred(n / LAKH, words);
        words.push("Lakh");
        n %= LAKH;
    }

    if n >= 1000 {
        below_hundred(n / 1000, words);
        words.push("Thousand");
        n %= 1000;
    }

    if n >= 100 {
        words.push(ONES[(n / 100) as usize]);
        words.push("Hundred");
        n %= 100;
    }

    below_hundred(n, words);
}

fn below_hundred(n: u64, words: &mut Vec<&'static str>) {
    match n {
        0 => {}
        1..20 => words.push(ONES[n as usize]),
        _ => {
            words.push(TENS[(n / 10) as usize]);
            if n % 10 > 0 {
                words.push(ONES[(n % 10) as usize]);
            }
        }
    }
}
