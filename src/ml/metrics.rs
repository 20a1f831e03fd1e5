use crate::ml::models::{ClassMetrics, ModelMetrics};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Fraction of matching predictions
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Confusion matrix; rows are true classes, columns predicted classes
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Array2<usize> {
    let mut matrix = Array2::zeros((n_classes, n_classes));
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        if t < n_classes && p < n_classes {
            matrix[[t, p]] += 1;
        }
    }
    matrix
}

/// Evaluate predictions against the truth; `class_names[i]` names class index `i`
pub fn calculate_metrics(y_true: &[usize], y_pred: &[usize], class_names: &[String]) -> ModelMetrics {
    let n_samples = y_true.len();
    if n_samples == 0 {
        return ModelMetrics::new();
    }
    let n_classes = class_names.len();
    let matrix = confusion_matrix(y_true, y_pred, n_classes);

    let mut per_class = BTreeMap::new();
    let mut macro_sums = (0.0, 0.0, 0.0);
    let mut weighted_sums = (0.0, 0.0, 0.0);

    for (class_idx, class_name) in class_names.iter().enumerate() {
        let tp = matrix[[class_idx, class_idx]];
        let predicted: usize = matrix.column(class_idx).sum();
        let support: usize = matrix.row(class_idx).sum();

        let precision = if predicted > 0 {
            tp as f64 / predicted as f64
        } else {
            0.0
        };

        let recall = if support > 0 {
            tp as f64 / support as f64
        } else {
            0.0
        };

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        macro_sums.0 += precision;
        macro_sums.1 += recall;
        macro_sums.2 += f1;

        let weight = support as f64 / n_samples as f64;
        weighted_sums.0 += precision * weight;
        weighted_sums.1 += recall * weight;
        weighted_sums.2 += f1 * weight;

        per_class.insert(
            class_name.clone(),
            ClassMetrics {
                precision,
                recall,
                f1_score: f1,
                support,
            },
        );
    }

    let n = n_classes.max(1) as f64;

    ModelMetrics {
        accuracy: accuracy(y_true, y_pred),
        precision: macro_sums.0 / n,
        recall: macro_sums.1 / n,
        f1_score: macro_sums.2 / n,
        weighted_precision: weighted_sums.0,
        weighted_recall: weighted_sums.1,
        weighted_f1_score: weighted_sums.2,
        confusion_matrix: Some(matrix),
        per_class_metrics: per_class,
        support: n_samples,
    }
}

/// Plain-text classification report with a trailing confusion matrix
pub fn format_report(metrics: &ModelMetrics, class_names: &[String]) -> String {
    let width = class_names
        .iter()
        .map(|c| c.len())
        .chain(["weighted avg".len()])
        .max()
        .unwrap_or(12);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>width$} {:>9} {:>9} {:>9} {:>9}",
        "", "precision", "recall", "f1-score", "support"
    );
    let _ = writeln!(out);

    for class_name in class_names {
        if let Some(m) = metrics.per_class_metrics.get(class_name) {
            let _ = writeln!(
                out,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class_name, m.precision, m.recall, m.f1_score, m.support
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
        "accuracy", "", "", metrics.accuracy, metrics.support
    );
    let _ = writeln!(
        out,
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        "macro avg", metrics.precision, metrics.recall, metrics.f1_score, metrics.support
    );
    let _ = writeln!(
        out,
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        "weighted avg",
        metrics.weighted_precision,
        metrics.weighted_recall,
        metrics.weighted_f1_score,
        metrics.support
    );

    if let Some(matrix) = &metrics.confusion_matrix {
        let _ = writeln!(out);
        let _ = writeln!(out, "Confusion matrix (rows = actual, columns = predicted):");
        let _ = write!(out, "{:>width$}", "");
        for class_name in class_names {
            let _ = write!(out, " {:>12}", class_name);
        }
        let _ = writeln!(out);
        for (i, class_name) in class_names.iter().enumerate() {
            let _ = write!(out, "{:>width$}", class_name);
            for j in 0..class_names.len() {
                let _ = write!(out, " {:>12}", matrix[[i, j]]);
            }
            let _ = writeln!(out);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("class_{}", i)).collect()
    }

    #[test]
    fn test_perfect_predictions() {
        let y = vec![0, 1, 2, 1, 0];
        let metrics = calculate_metrics(&y, &y, &names(3));
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.weighted_f1_score, 1.0);
        assert_eq!(metrics.support, 5);
    }

    #[test]
    fn test_per_class_metrics() {
        let y_true = vec![0, 0, 1, 1];
        let y_pred = vec![0, 1, 1, 1];
        let metrics = calculate_metrics(&y_true, &y_pred, &names(2));

        assert_eq!(metrics.accuracy, 0.75);
        let class_0 = &metrics.per_class_metrics["class_0"];
        assert_eq!(class_0.precision, 1.0);
        assert_eq!(class_0.recall, 0.5);
        assert_eq!(class_0.support, 2);

        let class_1 = &metrics.per_class_metrics["class_1"];
        assert!((class_1.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(class_1.recall, 1.0);
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let matrix = confusion_matrix(&[0, 0, 1, 2], &[0, 2, 1, 2], 3);
        assert_eq!(matrix[[0, 0]], 1);
        assert_eq!(matrix[[0, 2]], 1);
        assert_eq!(matrix[[1, 1]], 1);
        assert_eq!(matrix[[2, 2]], 1);
        assert_eq!(matrix.sum(), 4);
    }

    #[test]
    fn test_class_without_predictions() {
        let metrics = calculate_metrics(&[0, 1], &[0, 0], &names(2));
        let class_1 = &metrics.per_class_metrics["class_1"];
        assert_eq!(class_1.precision, 0.0);
        assert_eq!(class_1.f1_score, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let metrics = calculate_metrics(&[], &[], &names(2));
        assert_eq!(metrics.support, 0);
        assert!(metrics.per_class_metrics.is_empty());
    }

    #[test]
    fn test_report_mentions_every_class() {
        let class_names = vec!["Green".to_string(), "Red".to_string()];
        let metrics = calculate_metrics(&[0, 1, 1], &[0, 1, 0], &class_names);
        let report = format_report(&metrics, &class_names);
        assert!(report.contains("Green"));
        assert!(report.contains("Red"));
        assert!(report.contains("macro avg"));
        assert!(report.contains("Confusion matrix"));
    }
}
