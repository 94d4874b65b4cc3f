//! Join aggregator: post-run equivalence-class grouping over per-host
//! captured outputs.

use std::io::{self, Write};

use crate::color::Colors;

/// One equivalence class: the hosts (in roster order) that produced
/// byte-identical output, and that output.
pub struct ResultClass<'a> {
    pub members: Vec<&'a str>,
    pub output: &'a [u8],
}

/// Partition hosts by byte-exact equality of their captured outputs.
///
/// O(N²·L) in host count and output length: for each host whose
/// class is unassigned, walk the remainder and assign the same class to
/// every as-yet-unassigned host with identical output. `hosts` must already
/// be in roster order; classes are discovered and enumerated in that order.
pub fn partition<'a>(hosts: &[(&'a str, &'a [u8])]) -> Vec<ResultClass<'a>> {
    let mut class_of: Vec<Option<usize>> = vec![None; hosts.len()];
    let mut classes: Vec<ResultClass<'a>> = Vec::new();

    for i in 0..hosts.len() {
        if class_of[i].is_some() {
            continue;
        }
        let class_idx = classes.len();
        class_of[i] = Some(class_idx);
        let (name, output) = hosts[i];
        let mut members = vec![name];

        for j in (i + 1)..hosts.len() {
            if class_of[j].is_some() {
                continue;
            }
            if hosts[j].1 == output {
                class_of[j] = Some(class_idx);
                members.push(hosts[j].0);
            }
        }

        classes.push(ResultClass { members, output });
    }

    classes
}

/// Render the full join-mode report: summary line, then one block per class.
pub fn write_report(classes: &[ResultClass], total_hosts: usize, colors: &Colors, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "finished with {} unique result{}",
        colors.magenta(&classes.len().to_string()),
        if classes.len() == 1 { "" } else { "s" }
    )?;
    writeln!(out)?;

    for class in classes {
        let names = class.members.join(" ");
        writeln!(
            out,
            "hosts ({}/{}): {}",
            colors.magenta(&class.members.len().to_string()),
            colors.magenta(&total_hosts.to_string()),
            colors.cyan(&names)
        )?;
        out.write_all(class.output)?;
        if class.output.last() != Some(&b'\n') {
            out.write_all(b"\n")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorMode;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn two_hosts_identical_output_form_one_class() {
        let hosts = [("a", b"hello\n".as_slice()), ("b", b"hello\n".as_slice())];
        let classes = partition(&hosts);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].members, vec!["a", "b"]);
    }

    #[test]
    fn classes_preserve_first_seen_and_roster_order() {
        let hosts = [
            ("a", b"x".as_slice()),
            ("b", b"y".as_slice()),
            ("c", b"x".as_slice()),
            ("d", b"y".as_slice()),
        ];
        let classes = partition(&hosts);
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].members, vec!["a", "c"]);
        assert_eq!(classes[1].members, vec!["b", "d"]);
    }

    #[test]
    fn report_text_matches_scenario_one() {
        let hosts = [("a", b"hello\n".as_slice()), ("b", b"hello\n".as_slice())];
        let classes = partition(&hosts);
        let colors = Colors::resolve(ColorMode::Off);
        let mut out = Vec::new();
        write_report(&classes, 2, &colors, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "finished with 1 unique result\n\nhosts (2/2): a b\nhello\n\n"
        );
    }

    proptest! {
        #[test]
        fn union_of_classes_equals_roster_and_classes_are_disjoint(
            outputs in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..8), 1..12)
        ) {
            let names: Vec<String> = (0..outputs.len()).map(|i| format!("h{i}")).collect();
            let hosts: Vec<(&str, &[u8])> = names
                .iter()
                .zip(outputs.iter())
                .map(|(n, o)| (n.as_str(), o.as_slice()))
                .collect();
            let classes = partition(&hosts);

            let mut seen = BTreeSet::new();
            for class in &classes {
                for member in &class.members {
                    prop_assert!(seen.insert(*member), "host appeared in two classes");
                }
            }
            let roster: BTreeSet<&str> = names.iter().map(|s| s.as_str()).collect();
            prop_assert_eq!(seen, roster);

            for class in &classes {
                for member in &class.members {
                    let idx = names.iter().position(|n| n == member).unwrap();
                    prop_assert_eq!(outputs[idx].as_slice(), class.output);
                }
            }
        }
    }
}
