/**
 * HTML Parser Tests
 *
 * Node trees and errors produced for template markup
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{humanize_dom, humanize_line_column, parse, row};

    fn humanize_errors(source: &str) -> Vec<Vec<String>> {
        let (_, result) = parse(source);
        result
            .errors
            .iter()
            .map(|e| vec![e.msg.clone(), humanize_line_column(&e.span.start)])
            .collect()
    }

    mod text_nodes {
        use super::*;

        #[test]
        fn should_parse_root_level_text_nodes() {
            let (doc, result) = parse("a");
            assert_eq!(humanize_dom(&doc, result.root), vec![row(&["Text", "a", "0"])]);
        }

        #[test]
        fn should_parse_text_nodes_inside_regular_elements() {
            let (doc, result) = parse("<div>a</div>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![row(&["Element", "div", "0"]), row(&["Text", "a", "1"])]
            );
        }

        #[test]
        fn should_merge_text_around_stray_markup() {
            let (doc, result) = parse("<div>a<!--c-->b</div>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Text", "a", "1"]),
                    row(&["Comment", "c", "1"]),
                    row(&["Text", "b", "1"])
                ]
            );
        }

        #[test]
        fn should_parse_cdata_as_text() {
            let (doc, result) = parse("<div><![CDATA[<b>]]></div>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![row(&["Element", "div", "0"]), row(&["Text", "<b>", "1"])]
            );
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn should_parse_root_level_elements() {
            let (doc, result) = parse("<div></div><span></span>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![row(&["Element", "div", "0"]), row(&["Element", "span", "0"])]
            );
        }

        #[test]
        fn should_support_void_elements() {
            let (doc, result) = parse("<div><br><img>text</div>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Element", "br", "1"]),
                    row(&["Element", "img", "1"]),
                    row(&["Text", "text", "1"])
                ]
            );
        }

        #[test]
        fn should_close_void_elements_on_text_nodes() {
            let (doc, result) = parse("<p>before<br>after</p>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![
                    row(&["Element", "p", "0"]),
                    row(&["Text", "before", "1"]),
                    row(&["Element", "br", "1"]),
                    row(&["Text", "after", "1"])
                ]
            );
        }

        #[test]
        fn should_support_self_closing_custom_elements() {
            let (doc, result) = parse("<my-cmp/>text");
            assert!(result.errors.is_empty());
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![row(&["Element", "my-cmp", "0"]), row(&["Text", "text", "0"])]
            );
        }

        #[test]
        fn should_close_li_by_sibling_li() {
            let (doc, result) = parse("<ul><li>1<li>2</ul>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![
                    row(&["Element", "ul", "0"]),
                    row(&["Element", "li", "1"]),
                    row(&["Text", "1", "2"]),
                    row(&["Element", "li", "1"]),
                    row(&["Text", "2", "2"])
                ]
            );
        }

        #[test]
        fn should_keep_raw_text_in_style_elements() {
            let (doc, result) = parse("<style>a { color: red } <b></style>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![
                    row(&["Element", "style", "0"]),
                    row(&["Text", "a { color: red } <b>", "1"])
                ]
            );
        }
    }

    mod attributes {
        use super::*;

        #[test]
        fn should_parse_attributes_on_regular_elements() {
            let (doc, result) = parse("<div kEy=\"v\" key2=v2 flag></div>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Attribute", "kEy", "v"]),
                    row(&["Attribute", "key2", "v2"]),
                    row(&["Attribute", "flag", ""])
                ]
            );
        }

        #[test]
        fn should_keep_the_first_duplicate_attribute() {
            let (doc, result) = parse("<div a=\"1\" a=\"2\"></div>");
            assert_eq!(
                humanize_dom(&doc, result.root),
                vec![row(&["Element", "div", "0"]), row(&["Attribute", "a", "1"])]
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unexpected_closing_tags() {
            let errors = humanize_errors("<div></p></div>");
            assert_eq!(errors.len(), 1);
            assert!(errors[0][0].starts_with("Unexpected closing tag \"p\""));
            assert_eq!(errors[0][1], "0:5");
        }

        #[test]
        fn should_report_closing_tags_for_void_elements() {
            assert_eq!(
                humanize_errors("<input></input>"),
                vec![row(&["Void elements do not have end tags \"input\"", "0:7"])]
            );
        }

        #[test]
        fn should_report_self_closing_html_elements() {
            assert_eq!(
                humanize_errors("<p />"),
                vec![row(&[
                    "Only void, custom and foreign elements can be self closed \"p\"",
                    "0:3"
                ])]
            );
        }

        #[test]
        fn should_include_context_in_contextual_message() {
            let (_, result) = parse("<div>\n</span>\n</div>");
            assert_eq!(result.errors.len(), 1);
            let message = result.errors[0].contextual_message();
            assert!(message.contains("[ERROR ->]</span>"), "{}", message);
        }
    }
}
