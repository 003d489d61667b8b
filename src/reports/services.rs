use time::{Date, Duration};

use crate::{
    date_utils::{days_between, format_br},
    domain::{ReportKind, ReportPeriod},
    error::AppError,
};

/// Longest span a custom report may cover, in days.
pub const MAX_CUSTOM_SPAN_DAYS: i64 = 366;

/// Inclusive date range covered by a report period as of `today`.
/// Explicit dates are only read for `personalizado`.
pub fn resolve_range(
    period: ReportPeriod,
    today: Date,
    start: Option<Date>,
    end: Option<Date>,
) -> Result<(Date, Date), AppError> {
    let back = |days: i64| today.saturating_sub(Duration::days(days));
    match period {
        ReportPeriod::Today => Ok((today, today)),
        ReportPeriod::Last7Days => Ok((back(6), today)),
        ReportPeriod::Last30Days => Ok((back(29), today)),
        ReportPeriod::Custom => {
            let (Some(start), Some(end)) = (start, end) else {
                return Err(AppError::bad_request(
                    "dataInicio and dataFim are required for personalizado",
                ));
            };
            if start > end {
                return Err(AppError::bad_request(
                    "dataInicio must not be after dataFim",
                ));
            }
            if days_between(start, end) >= MAX_CUSTOM_SPAN_DAYS {
                return Err(AppError::bad_request(format!(
                    "custom period is limited to {MAX_CUSTOM_SPAN_DAYS} days"
                )));
            }
            Ok((start, end))
        }
    }
}

/// e.g. `Produção - 09/05/2025 a 15/05/2025`
pub fn report_title(kind: ReportKind, start: Date, end: Date) -> String {
    format!("{} - {} a {}", kind.title(), format_br(start), format_br(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 05 - 15);

    #[test]
    fn fixed_periods_end_today() {
        assert_eq!(
            resolve_range(ReportPeriod::Today, TODAY, None, None).unwrap(),
            (TODAY, TODAY)
        );
        assert_eq!(
            resolve_range(ReportPeriod::Last7Days, TODAY, None, None).unwrap(),
            (date!(2025 - 05 - 09), TODAY)
        );
        assert_eq!(
            resolve_range(ReportPeriod::Last30Days, TODAY, None, None).unwrap(),
            (date!(2025 - 04 - 16), TODAY)
        );
    }

    #[test]
    fn fixed_periods_ignore_explicit_dates() {
        let range = resolve_range(
            ReportPeriod::Today,
            TODAY,
            Some(date!(2020 - 01 - 01)),
            Some(date!(2020 - 01 - 02)),
        )
        .unwrap();
        assert_eq!(range, (TODAY, TODAY));
    }

    #[test]
    fn custom_period_validates_dates() {
        let ok = resolve_range(
            ReportPeriod::Custom,
            TODAY,
            Some(date!(2025 - 05 - 01)),
            Some(date!(2025 - 05 - 01)),
        );
        assert_eq!(ok.unwrap(), (date!(2025 - 05 - 01), date!(2025 - 05 - 01)));

        let reversed = resolve_range(
            ReportPeriod::Custom,
            TODAY,
            Some(date!(2025 - 05 - 10)),
            Some(date!(2025 - 05 - 01)),
        );
        assert!(matches!(reversed, Err(AppError::BadRequest(_))));

        let missing = resolve_range(ReportPeriod::Custom, TODAY, Some(TODAY), None);
        assert!(matches!(missing, Err(AppError::BadRequest(_))));

        let too_long = resolve_range(
            ReportPeriod::Custom,
            TODAY,
            Some(date!(2020 - 01 - 01)),
            Some(TODAY),
        );
        assert!(matches!(too_long, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn title_uses_brazilian_dates() {
        assert_eq!(
            report_title(ReportKind::Production, date!(2025 - 05 - 09), TODAY),
            "Produção - 09/05/2025 a 15/05/2025"
        );
        assert_eq!(
            report_title(ReportKind::Animals, TODAY, TODAY),
            "Animais - 15/05/2025 a 15/05/2025"
        );
    }
}
