use crate::constants::C_NAMESPACE;
use crate::parse_xml::{is_element, parse_document};
use crate::types::ChartType;
use crate::Result;
use roxmltree::Node;

/// Plot families in detection order. The first family present in the plot area wins.
const PRECEDENCE: &[(ChartType, &[&str])] = &[
    (ChartType::Pie, &["pieChart", "pie3DChart"]),
    (ChartType::Column, &["barChart", "bar3DChart"]),
    (ChartType::Bar, &["barChart", "bar3DChart"]),
    (ChartType::Line, &["lineChart", "line3DChart"]),
    (ChartType::Scatter, &["scatterChart"]),
    (ChartType::Area, &["areaChart", "area3DChart"]),
    (ChartType::Doughnut, &["doughnutChart"]),
    (ChartType::Bubble, &["bubbleChart"]),
];

/// Classifies a chart part (`ppt/charts/chartN.xml`) by the plots in its plot area.
///
/// Bar plots are split by `<c:barDir>`: `col` is a column chart, `bar` a bar
/// chart; a missing direction counts as `col`. A readable part whose plot area
/// matches nothing (or is missing) is [`ChartType::Unknown`].
///
/// # Errors
///
/// Fails only if the part is not valid UTF-8 or not well-formed XML.
pub fn detect_chart_type(xml_data: &[u8]) -> Result<ChartType> {
    let xml_str = std::str::from_utf8(xml_data)?;
    let doc = parse_document(xml_str)?;

    let Some(plot_area) = doc.descendants().find(|n| is_element(n, C_NAMESPACE, "plotArea")) else {
        return Ok(ChartType::Unknown);
    };

    let plots: Vec<Node> = plot_area
        .children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(C_NAMESPACE))
        .collect();

    for (chart_type, names) in PRECEDENCE {
        let matched = plots.iter().any(|plot| {
            names.contains(&plot.tag_name().name())
                && match chart_type {
                    ChartType::Column => bar_direction(plot) == "col",
                    ChartType::Bar => bar_direction(plot) == "bar",
                    _ => true,
                }
        });
        if matched {
            return Ok(*chart_type);
        }
    }

    Ok(ChartType::Unknown)
}

fn bar_direction<'a>(plot: &Node<'a, '_>) -> &'a str {
    plot.children()
        .find(|n| is_element(n, C_NAMESPACE, "barDir"))
        .and_then(|dir| dir.attribute("val"))
        .unwrap_or("col")
}
