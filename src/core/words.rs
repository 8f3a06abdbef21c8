//! Spanish amount-in-words rendering ("monto en palabras").

const UNITS: [&str; 10] = [
    "", "UN", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE",
];

const TEENS: [&str; 10] = [
    "DIEZ",
    "ONCE",
    "DOCE",
    "TRECE",
    "CATORCE",
    "QUINCE",
    "DIECISEIS",
    "DIECISIETE",
    "DIECIOCHO",
    "DIECINUEVE",
];

const TWENTIES: [&str; 10] = [
    "VEINTE",
    "VEINTIUN",
    "VEINTIDOS",
    "VEINTITRES",
    "VEINTICUATRO",
    "VEINTICINCO",
    "VEINTISEIS",
    "VEINTISIETE",
    "VEINTIOCHO",
    "VEINTINUEVE",
];

const TENS: [&str; 10] = [
    "", "", "", "TREINTA", "CUARENTA", "CINCUENTA", "SESENTA", "SETENTA", "OCHENTA", "NOVENTA",
];

const HUNDREDS: [&str; 10] = [
    "",
    "CIENTO",
    "DOSCIENTOS",
    "TRESCIENTOS",
    "CUATROCIENTOS",
    "QUINIENTOS",
    "SEISCIENTOS",
    "SETECIENTOS",
    "OCHOCIENTOS",
    "NOVECIENTOS",
];

const MILLION: u64 = 1_000_000;
const BILLION: u64 = 1_000_000_000_000;

/// Render a peso amount in uppercase Spanish words, as printed on a DTE.
///
/// The suffix is always `PESOS`, including for one peso and for round
/// millions (`UN MILLON PESOS`), matching the printed-document convention.
///
/// ```
/// use dte::core::amount_in_words;
/// assert_eq!(
///     amount_in_words(1_234_567),
///     "UN MILLON DOSCIENTOS TREINTA Y CUATRO MIL QUINIENTOS SESENTA Y SIETE PESOS"
/// );
/// assert_eq!(amount_in_words(0), "CERO PESOS");
/// ```
pub fn amount_in_words(amount: u64) -> String {
    match amount {
        0 => "CERO PESOS".to_string(),
        n => format!("{} PESOS", integer_words(n)),
    }
}

/// Words for a positive integer, grouped as billions, millions, thousands
/// and units.
fn integer_words(n: u64) -> String {
    let billions = n / BILLION;
    let millions = (n % BILLION) / MILLION;
    let thousands = (n % MILLION) / 1000;
    let units = n % 1000;

    let mut parts: Vec<String> = Vec::new();

    if billions > 0 {
        parts.push(match billions {
            1 => "UN BILLON".to_string(),
            b => format!("{} BILLONES", integer_words(b)),
        });
    }
    if millions > 0 {
        parts.push(match millions {
            1 => "UN MILLON".to_string(),
            m => format!("{} MILLONES", integer_words(m)),
        });
    }
    if thousands > 0 {
        parts.push(match thousands {
            1 => "MIL".to_string(),
            t => format!("{} MIL", group_words(t)),
        });
    }
    if units > 0 {
        parts.push(group_words(units));
    }

    parts.join(" ")
}

/// Words for 1..=999.
fn group_words(n: u64) -> String {
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;
    match (hundreds, rest) {
        (1, 0) => "CIEN".to_string(),
        (0, r) => tens_words(r),
        (h, 0) => HUNDREDS[h].to_string(),
        (h, r) => format!("{} {}", HUNDREDS[h], tens_words(r)),
    }
}

/// Words for 1..=99.
fn tens_words(n: usize) -> String {
    match n {
        1..=9 => UNITS[n].to_string(),
        10..=19 => TEENS[n - 10].to_string(),
        20..=29 => TWENTIES[n - 20].to_string(),
        _ if n % 10 == 0 => TENS[n / 10].to_string(),
        _ => format!("{} Y {}", TENS[n / 10], UNITS[n % 10]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_amounts() {
        assert_eq!(
            amount_in_words(1_234_567),
            "UN MILLON DOSCIENTOS TREINTA Y CUATRO MIL QUINIENTOS SESENTA Y SIETE PESOS"
        );
        assert_eq!(amount_in_words(0), "CERO PESOS");
        assert_eq!(
            amount_in_words(10_472),
            "DIEZ MIL CUATROCIENTOS SETENTA Y DOS PESOS"
        );
    }

    #[test]
    fn small_numbers() {
        assert_eq!(amount_in_words(1), "UN PESOS");
        assert_eq!(amount_in_words(7), "SIETE PESOS");
        assert_eq!(amount_in_words(10), "DIEZ PESOS");
        assert_eq!(amount_in_words(16), "DIECISEIS PESOS");
        assert_eq!(amount_in_words(20), "VEINTE PESOS");
        assert_eq!(amount_in_words(21), "VEINTIUN PESOS");
        assert_eq!(amount_in_words(29), "VEINTINUEVE PESOS");
        assert_eq!(amount_in_words(30), "TREINTA PESOS");
        assert_eq!(amount_in_words(31), "TREINTA Y UN PESOS");
        assert_eq!(amount_in_words(99), "NOVENTA Y NUEVE PESOS");
    }

    #[test]
    fn cien_versus_ciento() {
        assert_eq!(amount_in_words(100), "CIEN PESOS");
        assert_eq!(amount_in_words(101), "CIENTO UN PESOS");
        assert_eq!(amount_in_words(115), "CIENTO QUINCE PESOS");
        assert_eq!(amount_in_words(200), "DOSCIENTOS PESOS");
        assert_eq!(amount_in_words(999), "NOVECIENTOS NOVENTA Y NUEVE PESOS");
    }

    #[test]
    fn thousands_and_millions() {
        assert_eq!(amount_in_words(1000), "MIL PESOS");
        assert_eq!(amount_in_words(1001), "MIL UN PESOS");
        assert_eq!(amount_in_words(21_000), "VEINTIUN MIL PESOS");
        assert_eq!(amount_in_words(100_000), "CIEN MIL PESOS");
        assert_eq!(amount_in_words(1_000_000), "UN MILLON PESOS");
        assert_eq!(amount_in_words(2_500_000), "DOS MILLONES QUINIENTOS MIL PESOS");
        assert_eq!(amount_in_words(2_000_000), "DOS MILLONES PESOS");
        assert_eq!(amount_in_words(1_000_000_000), "MIL MILLONES PESOS");
        assert_eq!(amount_in_words(1_000_000_000_000), "UN BILLON PESOS");
    }
}
