/**
 * Lexer Tests
 *
 * Token streams produced for template markup
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{humanize_lexer_errors, humanize_parts, humanize_token_types, row};
    use htmel_dom::ml_parser::tokens::TokenType;

    mod tags {
        use super::*;

        #[test]
        fn should_parse_open_tags_without_prefix() {
            assert_eq!(
                humanize_parts("<test>"),
                vec![row(&["TagOpenStart", "test"]), row(&["TagOpenEnd"]), row(&["Eof"])]
            );
        }

        #[test]
        fn should_parse_void_tags() {
            assert_eq!(
                humanize_parts("<test/>"),
                vec![row(&["TagOpenStart", "test"]), row(&["TagOpenEndVoid"]), row(&["Eof"])]
            );
        }

        #[test]
        fn should_keep_tag_name_case() {
            assert_eq!(humanize_parts("<MyTag>")[0], row(&["TagOpenStart", "MyTag"]));
        }

        #[test]
        fn should_parse_close_tags_with_whitespace() {
            assert_eq!(
                humanize_parts("</ test >"),
                vec![row(&["Text", "</ test >"]), row(&["Eof"])]
            );
            assert_eq!(
                humanize_parts("</test >"),
                vec![row(&["TagClose", "test"]), row(&["Eof"])]
            );
        }

        #[test]
        fn should_report_unterminated_open_tags() {
            assert_eq!(
                humanize_token_types("<a b=\"c\""),
                vec![
                    TokenType::IncompleteTagOpen,
                    TokenType::AttrName,
                    TokenType::AttrQuote,
                    TokenType::AttrValueText,
                    TokenType::AttrQuote,
                    TokenType::Eof
                ]
            );
            assert_eq!(
                humanize_lexer_errors("<a b=\"c\""),
                vec![row(&["Opening tag \"a\" not terminated.", "0:0"])]
            );
        }

        #[test]
        fn should_accept_placeholder_shaped_names() {
            assert_eq!(
                humanize_parts("<x0-1->")[0],
                row(&["TagOpenStart", "x0-1-"])
            );
        }
    }

    mod attributes {
        use super::*;

        #[test]
        fn should_parse_attributes_without_value() {
            assert_eq!(
                humanize_parts("<t a>"),
                vec![
                    row(&["TagOpenStart", "t"]),
                    row(&["AttrName", "a"]),
                    row(&["TagOpenEnd"]),
                    row(&["Eof"])
                ]
            );
        }

        #[test]
        fn should_parse_attributes_with_double_and_single_quotes() {
            assert_eq!(
                humanize_parts("<t a=\"b\" c='d'>"),
                vec![
                    row(&["TagOpenStart", "t"]),
                    row(&["AttrName", "a"]),
                    row(&["AttrQuote", "\""]),
                    row(&["AttrValueText", "b"]),
                    row(&["AttrQuote", "\""]),
                    row(&["AttrName", "c"]),
                    row(&["AttrQuote", "'"]),
                    row(&["AttrValueText", "d"]),
                    row(&["AttrQuote", "'"]),
                    row(&["TagOpenEnd"]),
                    row(&["Eof"])
                ]
            );
        }

        #[test]
        fn should_parse_unquoted_values() {
            assert_eq!(
                humanize_parts("<t a=b>"),
                vec![
                    row(&["TagOpenStart", "t"]),
                    row(&["AttrName", "a"]),
                    row(&["AttrValueText", "b"]),
                    row(&["TagOpenEnd"]),
                    row(&["Eof"])
                ]
            );
        }

        #[test]
        fn should_allow_whitespace_around_equals() {
            assert_eq!(
                humanize_parts("<t a = \"b\">")[3],
                row(&["AttrValueText", "b"])
            );
        }

        #[test]
        fn should_decode_entities_in_values() {
            assert_eq!(
                humanize_parts("<t a=\"&amp;&#65;&#x42;\">")[3],
                row(&["AttrValueText", "&AB"])
            );
        }

        #[test]
        fn should_keep_attribute_name_case() {
            assert_eq!(humanize_parts("<t onClick=\"x\">")[1], row(&["AttrName", "onClick"]));
        }
    }

    mod text {
        use super::*;

        #[test]
        fn should_decode_named_entities() {
            assert_eq!(
                humanize_parts("a&amp;b&lt;c"),
                vec![row(&["Text", "a&b<c"]), row(&["Eof"])]
            );
        }

        #[test]
        fn should_keep_unknown_entities_verbatim() {
            assert_eq!(
                humanize_parts("&unknown; &"),
                vec![row(&["Text", "&unknown; &"]), row(&["Eof"])]
            );
        }

        #[test]
        fn should_treat_lone_less_than_as_text() {
            assert_eq!(
                humanize_parts("a <= b"),
                vec![row(&["Text", "a <= b"]), row(&["Eof"])]
            );
        }
    }

    mod raw_text {
        use super::*;

        #[test]
        fn should_not_tokenize_markup_inside_script() {
            assert_eq!(
                humanize_parts("<script>a<b>&amp;</script>"),
                vec![
                    row(&["TagOpenStart", "script"]),
                    row(&["TagOpenEnd"]),
                    row(&["RawText", "a<b>&amp;"]),
                    row(&["TagClose", "script"]),
                    row(&["Eof"])
                ]
            );
        }

        #[test]
        fn should_decode_entities_inside_textarea() {
            assert_eq!(
                humanize_parts("<textarea>&amp;<b></textarea>")[2],
                row(&["EscapableRawText", "&<b>"])
            );
        }

        #[test]
        fn should_match_closing_tag_case_insensitively() {
            assert_eq!(
                humanize_parts("<style>a</STYLE>")[3],
                row(&["TagClose", "STYLE"])
            );
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn should_parse_comments() {
            assert_eq!(
                humanize_parts("<!--t-->"),
                vec![
                    row(&["CommentStart"]),
                    row(&["RawText", "t"]),
                    row(&["CommentEnd"]),
                    row(&["Eof"])
                ]
            );
        }

        #[test]
        fn should_report_unterminated_comments() {
            assert_eq!(
                humanize_lexer_errors("<!--abc"),
                vec![row(&["Unexpected character \"EOF\"", "0:7"])]
            );
        }

        #[test]
        fn should_parse_cdata() {
            assert_eq!(
                humanize_parts("<![CDATA[t]]>"),
                vec![
                    row(&["CdataStart"]),
                    row(&["Text", "t"]),
                    row(&["CdataEnd"]),
                    row(&["Eof"])
                ]
            );
        }

        #[test]
        fn should_parse_doctype() {
            assert_eq!(
                humanize_parts("<!DOCTYPE html>"),
                vec![row(&["DocType", "DOCTYPE html"]), row(&["Eof"])]
            );
        }
    }

    mod line_endings {
        use super::*;

        #[test]
        fn should_normalise_crlf() {
            assert_eq!(
                humanize_parts("a\r\nb"),
                vec![row(&["Text", "a\nb"]), row(&["Eof"])]
            );
        }
    }
}
